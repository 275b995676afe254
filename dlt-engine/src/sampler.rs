use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use dlt_db::models::Zone;

/// Tire `n` numéros distincts uniformément dans `pool`.
///
/// Si le pool est trop petit, le complément est pris dans le domaine de la zone,
/// dans l'ordre croissant, en sautant les numéros déjà retenus. Le résultat est
/// trié et fait toujours exactement `n` numéros (n ≤ taille de la zone).
pub fn sample_exactly(pool: &[u8], zone: Zone, n: usize, rng: &mut StdRng) -> Vec<u8> {
    let mut picked = pool.to_vec();
    picked.shuffle(rng);
    picked.truncate(n);
    pad_in_domain_order(&mut picked, zone, n);
    picked.sort_unstable();
    picked
}

pub fn pad_in_domain_order(selected: &mut Vec<u8>, zone: Zone, n: usize) {
    for number in zone.domain() {
        if selected.len() >= n {
            break;
        }
        if !selected.contains(&number) {
            selected.push(number);
        }
    }
}

/// Complète avec des numéros du domaine tirés uniformément parmi ceux non retenus.
pub fn pad_uniform(selected: &mut Vec<u8>, zone: Zone, n: usize, rng: &mut StdRng) {
    if selected.len() >= n {
        return;
    }
    let mut remaining: Vec<u8> = zone.domain().filter(|x| !selected.contains(x)).collect();
    remaining.shuffle(rng);
    let missing = n - selected.len();
    selected.extend(remaining.into_iter().take(missing));
}

/// Grille uniforme : domaine mélangé, `pick_count` premiers, triés.
pub fn uniform_pick(zone: Zone, rng: &mut StdRng) -> Vec<u8> {
    let mut domain: Vec<u8> = zone.domain().collect();
    domain.shuffle(rng);
    domain.truncate(zone.pick_count());
    domain.sort_unstable();
    domain
}

/// Un tirage pondéré parmi les numéros absents de `exclude`.
/// `None` si aucun poids exploitable ne reste.
pub fn weighted_pick(weights: &[(u8, f64)], exclude: &[u8], rng: &mut StdRng) -> Option<u8> {
    let available: Vec<(u8, f64)> = weights
        .iter()
        .filter(|(n, _)| !exclude.contains(n))
        .copied()
        .collect();
    let dist = WeightedIndex::new(available.iter().map(|(_, w)| *w)).ok()?;
    Some(available[dist.sample(rng)].0)
}

/// Tirage sans remise proportionnel aux poids restants.
///
/// Un vecteur de poids dégénéré (vide, nul, négatif) bascule sur un tirage
/// uniforme parmi les numéros restants au lieu d'échouer.
pub fn weighted_without_replacement(weights: &[(u8, f64)], n: usize, rng: &mut StdRng) -> Vec<u8> {
    let mut available = weights.to_vec();
    let mut selected = Vec::with_capacity(n);

    while selected.len() < n && !available.is_empty() {
        let idx = match WeightedIndex::new(available.iter().map(|(_, w)| *w)) {
            Ok(dist) => dist.sample(rng),
            Err(e) => {
                log::debug!("poids inutilisables ({e}), tirage uniforme");
                rng.random_range(0..available.len())
            }
        };
        let (number, _) = available.remove(idx);
        selected.push(number);
    }

    selected.sort_unstable();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn assert_valid(numbers: &[u8], zone: Zone) {
        assert!(
            dlt_db::models::zone_is_well_formed(numbers, zone),
            "grille invalide pour {:?}: {:?}", zone, numbers
        );
    }

    #[test]
    fn test_sample_exactly_from_large_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool: Vec<u8> = (10..=20).collect();
        for _ in 0..50 {
            let picked = sample_exactly(&pool, Zone::Front, 5, &mut rng);
            assert_valid(&picked, Zone::Front);
            assert!(picked.iter().all(|n| pool.contains(n)));
        }
    }

    #[test]
    fn test_sample_exactly_pads_in_domain_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let picked = sample_exactly(&[30, 2], Zone::Front, 5, &mut rng);
        assert_eq!(picked, vec![1, 2, 3, 4, 30]);
    }

    #[test]
    fn test_sample_exactly_empty_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample_exactly(&[], Zone::Front, 5, &mut rng), vec![1, 2, 3, 4, 5]);
        assert_eq!(sample_exactly(&[], Zone::Back, 2, &mut rng), vec![1, 2]);
    }

    #[test]
    fn test_back_padding_stays_in_back_domain() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut selected: Vec<u8> = (1..=11).collect();
        pad_in_domain_order(&mut selected, Zone::Back, 13);
        assert_eq!(selected.len(), 12);
        assert_eq!(*selected.last().unwrap(), 12);

        let mut selected = vec![7];
        pad_uniform(&mut selected, Zone::Back, 2, &mut rng);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|&n| Zone::Back.contains(n)));
        assert_ne!(selected[0], selected[1]);
    }

    #[test]
    fn test_uniform_pick_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_valid(&uniform_pick(Zone::Front, &mut rng), Zone::Front);
            assert_valid(&uniform_pick(Zone::Back, &mut rng), Zone::Back);
        }
    }

    #[test]
    fn test_weighted_without_replacement_distinct() {
        let mut rng = StdRng::seed_from_u64(6);
        let weights: Vec<(u8, f64)> = Zone::Front.domain().map(|n| (n, n as f64)).collect();
        for _ in 0..100 {
            assert_valid(&weighted_without_replacement(&weights, 5, &mut rng), Zone::Front);
        }
    }

    #[test]
    fn test_weighted_without_replacement_prefers_heavy() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights: Vec<(u8, f64)> = Zone::Back
            .domain()
            .map(|n| (n, if n == 12 { 1000.0 } else { 1.0 }))
            .collect();
        let hits = (0..200)
            .filter(|_| weighted_without_replacement(&weights, 2, &mut rng).contains(&12))
            .count();
        assert!(hits > 180, "12 devrait presque toujours sortir: {hits}/200");
    }

    #[test]
    fn test_weighted_without_replacement_degenerate_weights() {
        let mut rng = StdRng::seed_from_u64(8);
        let zeros: Vec<(u8, f64)> = Zone::Back.domain().map(|n| (n, 0.0)).collect();
        assert_valid(&weighted_without_replacement(&zeros, 2, &mut rng), Zone::Back);

        let nan: Vec<(u8, f64)> = Zone::Back.domain().map(|n| (n, f64::NAN)).collect();
        assert_valid(&weighted_without_replacement(&nan, 2, &mut rng), Zone::Back);
    }

    #[test]
    fn test_weighted_pick_respects_exclusion() {
        let mut rng = StdRng::seed_from_u64(9);
        let weights = vec![(1u8, 1.0), (2, 1.0), (3, 1.0)];
        for _ in 0..20 {
            assert_eq!(weighted_pick(&weights, &[1, 2], &mut rng), Some(3));
        }
        assert_eq!(weighted_pick(&weights, &[1, 2, 3], &mut rng), None);
    }
}

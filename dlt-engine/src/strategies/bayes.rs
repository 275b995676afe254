use rand::rngs::StdRng;

use dlt_db::models::{DrawRecord, Zone};

use super::{GroupStrategy, StrategyInput};
use crate::sampler::{pad_uniform, uniform_pick, weighted_pick};

/// Groupe 8 : fréquence par position de saisie, lissage de Laplace.
pub struct PositionalBayesStrategy;

/// Pour chaque position enregistrée, poids `compte + 1` de chaque numéro.
pub fn positional_weights(history: &[DrawRecord], zone: Zone) -> Vec<Vec<(u8, f64)>> {
    let mut counts = vec![vec![0u32; zone.size()]; zone.pick_count()];
    for draw in history {
        for (pos, &n) in zone.numbers_from(draw).iter().enumerate() {
            if zone.contains(n) {
                counts[pos][(n - 1) as usize] += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|row| zone.domain().map(|n| (n, row[(n - 1) as usize] as f64 + 1.0)).collect())
        .collect()
}

impl GroupStrategy for PositionalBayesStrategy {
    fn group(&self) -> u8 {
        8
    }

    fn name(&self) -> &str {
        "Bayes positionnel"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        if input.history.len() < input.config.bayes_min_history {
            return uniform_pick(zone, rng);
        }

        let mut picked = Vec::with_capacity(zone.pick_count());
        for weights in positional_weights(input.history, zone) {
            match weighted_pick(&weights, &picked, rng) {
                Some(n) => picked.push(n),
                None => {
                    let target = picked.len() + 1;
                    pad_uniform(&mut picked, zone, target, rng);
                }
            }
        }
        pad_uniform(&mut picked, zone, zone.pick_count(), rng);
        picked.sort_unstable();
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::fixture::{Fixture, draw};
    use dlt_db::models::zone_is_well_formed;
    use rand::SeedableRng;

    #[test]
    fn test_positional_counts_use_stored_order() {
        let history = vec![draw([7, 1, 2, 3, 4], [12, 1]), draw([7, 2, 3, 4, 5], [1, 12])];
        let weights = positional_weights(&history, Zone::Front);
        assert_eq!(weights.len(), 5);
        assert_eq!(weights[0][6], (7, 3.0));
        assert_eq!(weights[1][0], (1, 2.0));
        assert_eq!(weights[1][6], (7, 1.0));

        let back = positional_weights(&history, Zone::Back);
        assert_eq!(back.len(), 2);
        assert_eq!(back[0][11], (12, 2.0));
        assert_eq!(back[1][11], (12, 2.0));
        assert_eq!(back[0][5], (6, 1.0));
    }

    #[test]
    fn test_pick_is_well_formed() {
        let fx = Fixture::new(vec![draw([1, 2, 3, 4, 5], [1, 2])]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(zone_is_well_formed(&PositionalBayesStrategy.pick(&fx.input(), Zone::Front, &mut rng), Zone::Front));
            assert!(zone_is_well_formed(&PositionalBayesStrategy.pick(&fx.input(), Zone::Back, &mut rng), Zone::Back));
        }
    }

    #[test]
    fn test_empty_history_is_uniform() {
        let fx = Fixture::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(2);
        let back = PositionalBayesStrategy.pick(&fx.input(), Zone::Back, &mut rng);
        assert!(zone_is_well_formed(&back, Zone::Back));
    }
}

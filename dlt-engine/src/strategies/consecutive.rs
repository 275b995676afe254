use std::collections::BTreeSet;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use dlt_db::models::Zone;

use super::{GroupStrategy, StrategyInput};
use crate::frequency::ZoneStats;
use crate::pool::{exclude, least_frequent_seen, second_least_frequent_seen};
use crate::sampler::{pad_uniform, uniform_pick};

/// Groupe 12 : réagit à la présence d'un couple de numéros consécutifs au
/// dernier tirage.
pub struct ConsecutiveStrategy;

/// Vrai si deux numéros de la grille se suivent (différence de 1 une fois triés).
pub fn has_consecutive(numbers: &[u8]) -> bool {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[1] == w[0] + 1)
}

/// Les couples `(a, a + 1)` présents dans `candidates` hors `excluded`.
fn adjacent_pairs(candidates: &[u8], excluded: &[u8]) -> (Vec<u8>, Vec<(u8, u8)>) {
    let mut available: Vec<u8> = candidates.iter().copied().filter(|n| !excluded.contains(n)).collect();
    available.sort_unstable();
    let pairs = available
        .windows(2)
        .filter(|w| w[1] == w[0] + 1)
        .map(|w| (w[0], w[1]))
        .collect();
    (available, pairs)
}

fn take_shuffled(selected: &mut Vec<u8>, mut pool: Vec<u8>, count: usize, rng: &mut StdRng) {
    pool.shuffle(rng);
    let mut added = 0;
    for n in pool {
        if added >= count {
            break;
        }
        if !selected.contains(&n) {
            selected.push(n);
            added += 1;
        }
    }
}

fn pick_front(stats: &ZoneStats, last_front: &[u8], rng: &mut StdRng) -> Vec<u8> {
    let zone = Zone::Front;
    let n = zone.pick_count();
    let never = exclude(zone, &stats.seen);
    let least = least_frequent_seen(stats);
    let mut picked = Vec::with_capacity(n);

    if has_consecutive(last_front) {
        let mut never_count = never.len().clamp(1, 3);
        if rng.random_bool(0.5) && never_count > 1 {
            never_count = rng.random_range(1..=never_count);
        }
        take_shuffled(&mut picked, never, never_count, rng);
        let missing = n.saturating_sub(picked.len());
        take_shuffled(&mut picked, least, missing, rng);
    } else {
        take_shuffled(&mut picked, never, 1, rng);
        take_shuffled(&mut picked, least, 2, rng);

        let second = second_least_frequent_seen(stats);
        let (available, pairs) = adjacent_pairs(&second, &picked);
        match pairs.choose(rng) {
            Some(&(a, b)) => picked.extend([a, b]),
            None => take_shuffled(&mut picked, available, 2, rng),
        }
    }

    pad_uniform(&mut picked, zone, n, rng);
    picked.sort_unstable();
    picked
}

fn pick_back(stats: &ZoneStats, last_back: &[u8], rng: &mut StdRng) -> Vec<u8> {
    let zone = Zone::Back;
    let n = zone.pick_count();
    let last: BTreeSet<u8> = last_back.iter().copied().collect();

    let never: Vec<u8> = zone
        .domain()
        .filter(|x| !stats.seen.contains(x) && !last.contains(x))
        .collect();
    let least: Vec<u8> = least_frequent_seen(stats)
        .into_iter()
        .filter(|x| !last.contains(x))
        .collect();

    let mut picked = Vec::with_capacity(n);
    take_shuffled(&mut picked, never, 1, rng);
    take_shuffled(&mut picked, least, 1, rng);

    // Complément hors dernier tirage, sinon premier numéro libre du domaine
    while picked.len() < n {
        let remaining: Vec<u8> = zone
            .domain()
            .filter(|x| !picked.contains(x) && !last.contains(x))
            .collect();
        let next = match remaining.choose(rng) {
            Some(&x) => Some(x),
            None => zone.domain().find(|x| !picked.contains(x)),
        };
        match next {
            Some(x) => picked.push(x),
            None => break,
        }
    }

    picked.sort_unstable();
    picked
}

impl GroupStrategy for ConsecutiveStrategy {
    fn group(&self) -> u8 {
        12
    }

    fn name(&self) -> &str {
        "Détection de consécutifs"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let Some(last) = input.last_draw() else {
            return uniform_pick(zone, rng);
        };
        let stats = input.window.zone(zone);
        match zone {
            Zone::Front => pick_front(stats, &last.front, rng),
            Zone::Back => pick_back(stats, &last.back, rng),
        }
    }
}

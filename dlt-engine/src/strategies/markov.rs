use std::collections::HashMap;

use rand::rngs::StdRng;

use dlt_db::models::{DrawRecord, Zone};

use super::{GroupStrategy, StrategyInput};
use crate::sampler::{uniform_pick, weighted_without_replacement};

/// Groupe 7 : transitions entre ensembles de numéros d'un tirage au suivant.
///
/// L'état est l'ensemble trié des numéros d'un tirage ; on compte, pour chaque
/// état, les numéros apparus au tirage suivant. Le dernier tirage fixe l'état
/// courant, chaque numéro reçoit le poids `compte + 1`.
pub struct MarkovStrategy;

type TransitionTable = HashMap<Vec<u8>, Vec<u32>>;

fn state_of(zone: Zone, draw: &DrawRecord) -> Vec<u8> {
    let mut state = zone.numbers_from(draw).to_vec();
    state.sort_unstable();
    state
}

fn transitions(history: &[DrawRecord], zone: Zone) -> TransitionTable {
    let mut table = TransitionTable::new();
    for pair in history.windows(2) {
        let counts = table
            .entry(state_of(zone, &pair[0]))
            .or_insert_with(|| vec![0; zone.size()]);
        for &n in zone.numbers_from(&pair[1]) {
            if zone.contains(n) {
                counts[(n - 1) as usize] += 1;
            }
        }
    }
    table
}

/// Poids `compte + 1` de chaque numéro du domaine sachant l'état courant.
pub fn next_weights(history: &[DrawRecord], zone: Zone) -> Vec<(u8, f64)> {
    let table = transitions(history, zone);
    let current = history.last().and_then(|d| table.get(&state_of(zone, d)));
    zone.domain()
        .map(|n| {
            let count = current.map(|c| c[(n - 1) as usize]).unwrap_or(0);
            (n, count as f64 + 1.0)
        })
        .collect()
}

impl GroupStrategy for MarkovStrategy {
    fn group(&self) -> u8 {
        7
    }

    fn name(&self) -> &str {
        "Markov"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        if input.history.len() < input.config.markov_min_history {
            log::debug!("Markov: {} tirage(s), tirage uniforme", input.history.len());
            return uniform_pick(zone, rng);
        }
        let weights = next_weights(input.history, zone);
        weighted_without_replacement(&weights, zone.pick_count(), rng)
    }
}

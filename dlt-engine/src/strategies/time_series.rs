use std::collections::BTreeMap;

use rand::rngs::StdRng;

use dlt_db::models::{DrawRecord, Zone};

use super::{GroupStrategy, StrategyInput};
use crate::sampler::{uniform_pick, weighted_without_replacement};

/// Groupe 10 : cycle de réapparition, forme récente et retard.
pub struct CyclicalStrategy;

const CYCLIC_WEIGHT: f64 = 0.5;
const RECENT_WEIGHT: f64 = 0.3;
const COLD_WEIGHT: f64 = 0.2;
const MIN_WEIGHT: f64 = 0.1;

/// Intervalle le plus fréquent entre apparitions successives et son nombre
/// d'occurrences. À égalité, le plus petit intervalle l'emporte.
fn modal_gap(positions: &[usize]) -> Option<(usize, usize)> {
    let mut gaps: BTreeMap<usize, usize> = BTreeMap::new();
    for pair in positions.windows(2) {
        *gaps.entry(pair[1] - pair[0]).or_default() += 1;
    }
    // BTreeMap croissant : max_by garde le dernier maximum, d'où l'ordre inversé
    gaps.into_iter().rev().max_by_key(|&(_, count)| count)
}

/// Score d'un numéro à partir de ses positions d'apparition dans l'historique.
pub fn number_score(positions: &[usize], len: usize, recent_span: usize) -> f64 {
    let Some(&last) = positions.last() else {
        return 1.0;
    };
    if positions.len() < 2 {
        return 1.0;
    }

    let current = len as f64;
    let cyclic = match modal_gap(positions) {
        Some((gap, count)) if count > 1 => {
            let expected = (last + gap) as f64;
            (10.0 - (current - expected).abs()).max(0.0)
        }
        _ => 0.0,
    };

    let span = recent_span.min(len).max(1);
    let threshold = len - span;
    let hits = positions.iter().filter(|&&p| p >= threshold).count();
    let recent = hits as f64 / span as f64 * 5.0;

    let cold = ((current - last as f64 - 1.0) * 0.5).min(5.0);

    CYCLIC_WEIGHT * cyclic + RECENT_WEIGHT * recent + COLD_WEIGHT * cold
}

/// Poids de chaque numéro du domaine, plancher à 0.1.
pub fn cyclical_weights(history: &[DrawRecord], zone: Zone, recent_span: usize) -> Vec<(u8, f64)> {
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); zone.size()];
    for (i, draw) in history.iter().enumerate() {
        for &n in zone.numbers_from(draw) {
            if zone.contains(n) {
                positions[(n - 1) as usize].push(i);
            }
        }
    }
    zone.domain()
        .map(|n| {
            let score = number_score(&positions[(n - 1) as usize], history.len(), recent_span);
            (n, score.max(MIN_WEIGHT))
        })
        .collect()
}

impl GroupStrategy for CyclicalStrategy {
    fn group(&self) -> u8 {
        10
    }

    fn name(&self) -> &str {
        "Séries temporelles"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        if input.history.len() < input.config.time_series_min_history {
            log::debug!("Séries temporelles: {} tirage(s), tirage uniforme", input.history.len());
            return uniform_pick(zone, rng);
        }
        let weights = cyclical_weights(input.history, zone, input.config.time_series_recent);
        weighted_without_replacement(&weights, zone.pick_count(), rng)
    }
}

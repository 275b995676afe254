use ndarray::{Array1, Array2};
use rand::Rng;
use rand::rngs::StdRng;

use dlt_db::models::{DrawRecord, Zone};

use super::{GroupStrategy, StrategyInput};
use crate::config::NeuralConfig;
use crate::history::recent;
use crate::sampler::{uniform_pick, weighted_without_replacement};

/// Groupe 9 : réseau à une couche cachée, poids tirés à chaque appel.
///
/// Le réseau n'est pas entraîné : il sert de transformation aléatoire de
/// l'historique récent en scores, puis en poids de tirage.
pub struct FeedForwardStrategy;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Encodage binaire : un bloc de `size` cases par tirage, 1 si le numéro est sorti.
pub fn encode_input(draws: &[DrawRecord], zone: Zone) -> Array1<f64> {
    let size = zone.size();
    let mut x = Array1::zeros(draws.len() * size);
    for (i, draw) in draws.iter().enumerate() {
        for &n in zone.numbers_from(draw) {
            if zone.contains(n) {
                x[i * size + (n - 1) as usize] = 1.0;
            }
        }
    }
    x
}

/// Poids N(mean, std) tirés ligne par ligne (Box-Muller).
fn gaussian_matrix(rows: usize, cols: usize, config: &NeuralConfig, rng: &mut StdRng) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |_| {
        let u1: f64 = rng.random::<f64>().max(1e-15);
        let u2: f64 = rng.random::<f64>();
        let z = (-2.0f64 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        config.weight_mean + config.weight_std * z
    })
}

/// Scores de sortie (un par numéro du domaine), tous dans ]0, 1[.
pub fn forward_scores(input: &Array1<f64>, zone: Zone, config: &NeuralConfig, rng: &mut StdRng) -> Array1<f64> {
    let hidden = config.hidden_units(zone);
    let w_hidden = gaussian_matrix(hidden, input.len(), config, rng);
    let w_out = gaussian_matrix(zone.size(), hidden, config, rng);

    let h = w_hidden.dot(input).mapv(sigmoid);
    w_out.dot(&h).mapv(sigmoid)
}

impl GroupStrategy for FeedForwardStrategy {
    fn group(&self) -> u8 {
        9
    }

    fn name(&self) -> &str {
        "Réseau neuronal"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let config = &input.config.neural;
        if input.history.len() < config.min_history {
            log::debug!("Réseau: {} tirage(s), tirage uniforme", input.history.len());
            return uniform_pick(zone, rng);
        }

        let x = encode_input(recent(input.history, config.input_draws), zone);
        let scores = forward_scores(&x, zone, config, rng);
        let weights: Vec<(u8, f64)> = zone.domain().zip(scores.iter().copied()).collect();
        weighted_without_replacement(&weights, zone.pick_count(), rng)
    }
}

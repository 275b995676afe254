use rand::rngs::StdRng;

use dlt_db::models::Zone;

use super::{GroupStrategy, StrategyInput};
use crate::sampler::uniform_pick;

/// Groupe 11 : tirage uniforme, sans lecture de l'historique.
pub struct UniformStrategy;

impl GroupStrategy for UniformStrategy {
    fn group(&self) -> u8 {
        11
    }

    fn name(&self) -> &str {
        "Aléatoire"
    }

    fn pick(&self, _input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        uniform_pick(zone, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::fixture::{Fixture, draw};
    use rand::SeedableRng;

    #[test]
    fn test_uniform_covers_domain() {
        let fx = Fixture::new(vec![draw([1, 2, 3, 4, 5], [1, 2])]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = [false; 12];
        for _ in 0..200 {
            for n in UniformStrategy.pick(&fx.input(), Zone::Back, &mut rng) {
                seen[(n - 1) as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "chaque numéro arrière devrait sortir");
    }
}

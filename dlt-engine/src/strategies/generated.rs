use rand::rngs::StdRng;

use dlt_db::models::Zone;

use super::{GroupStrategy, StrategyInput};
use crate::frequency::{FrequencyTable, ZoneStats};
use crate::pool::pad_from_count_tiers;
use crate::sampler::pad_in_domain_order;

/// Groupe 13 : les numéros les moins repris par les groupes 1 à 12.
///
/// Seuls les numéros effectivement proposés par ces groupes sont candidats,
/// palier de compte par palier de compte ; le domaine ne sert qu'en dernier
/// recours.
pub struct LeastGeneratedStrategy;

impl GroupStrategy for LeastGeneratedStrategy {
    fn group(&self) -> u8 {
        13
    }

    fn name(&self) -> &str {
        "Moins générés"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let counts = FrequencyTable::from_numbers(zone, input.earlier(12).flat_map(|g| zone.numbers_of(g)));
        let stats = ZoneStats { seen: counts.seen(), counts };
        let n = zone.pick_count();

        let mut picked = Vec::with_capacity(n);
        pad_from_count_tiers(&mut picked, &stats, n, rng);
        pad_in_domain_order(&mut picked, zone, n);
        picked.sort_unstable();
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::make_test_history;
    use crate::strategies::fixture::Fixture;
    use dlt_db::models::{GroupResult, zone_is_well_formed};
    use rand::SeedableRng;

    fn twelve_groups() -> Vec<GroupResult> {
        let mut groups = vec![GroupResult::new(vec![1, 2, 3, 4, 5], vec![1, 2]); 10];
        groups.push(GroupResult::new(vec![1, 2, 3, 30, 31], vec![1, 9]));
        groups.push(GroupResult::new(vec![1, 2, 3, 30, 32], vec![1, 10]));
        groups
    }

    #[test]
    fn test_least_generated_tiers() {
        let fx = Fixture::new(make_test_history(5)).with_prior(twelve_groups());
        let mut rng = StdRng::seed_from_u64(1);
        let front = LeastGeneratedStrategy.pick(&fx.input(), Zone::Front, &mut rng);
        // 31, 32 (compte 1) puis 30 (compte 2) puis deux parmi 4, 5 (compte 10)
        assert_eq!(front, vec![4, 5, 30, 31, 32]);
        let back = LeastGeneratedStrategy.pick(&fx.input(), Zone::Back, &mut rng);
        assert_eq!(back, vec![9, 10]);
    }

    #[test]
    fn test_nothing_generated_pads_in_order() {
        let fx = Fixture::new(make_test_history(5)).with_prior(vec![GroupResult::empty(); 12]);
        let mut rng = StdRng::seed_from_u64(2);
        let front = LeastGeneratedStrategy.pick(&fx.input(), Zone::Front, &mut rng);
        assert_eq!(front, vec![1, 2, 3, 4, 5]);
        assert!(zone_is_well_formed(&front, Zone::Front));
    }
}

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use dlt_db::models::Zone;

use super::{GroupStrategy, StrategyInput};
use crate::frequency::FrequencyTable;
use crate::pool::{Extreme, exclude, pad_from_count_tiers, select_by_extreme_count};
use crate::sampler::{pad_in_domain_order, sample_exactly};

/// Groupe 1 : numéros absents de la fenêtre récente.
pub struct ExclusionStrategy;

impl GroupStrategy for ExclusionStrategy {
    fn group(&self) -> u8 {
        1
    }

    fn name(&self) -> &str {
        "Exclusion"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let stats = input.window.zone(zone);
        let n = zone.pick_count();
        let pool = exclude(zone, &stats.seen);
        if pool.len() >= n {
            return sample_exactly(&pool, zone, n, rng);
        }

        // Pas assez de numéros absents : on complète avec les moins sortis
        let mut picked = pool;
        pad_from_count_tiers(&mut picked, stats, n, rng);
        pad_in_domain_order(&mut picked, zone, n);
        picked.sort_unstable();
        picked
    }
}

/// Groupe 2 : les plus fréquents de la fenêtre.
pub struct TopFrequentStrategy;

impl GroupStrategy for TopFrequentStrategy {
    fn group(&self) -> u8 {
        2
    }

    fn name(&self) -> &str {
        "Plus fréquents"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let counts = &input.window.zone(zone).counts;
        select_by_extreme_count(counts, zone.pick_count(), Extreme::Most, false, rng)
    }
}

/// Groupe 3 : les moins fréquents parmi les numéros vus dans la fenêtre.
pub struct LeastFrequentStrategy;

impl GroupStrategy for LeastFrequentStrategy {
    fn group(&self) -> u8 {
        3
    }

    fn name(&self) -> &str {
        "Moins fréquents"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let counts = &input.window.zone(zone).counts;
        let n = zone.pick_count();
        let mut picked = select_by_extreme_count(counts, n, Extreme::Least, true, rng);
        pad_in_domain_order(&mut picked, zone, n);
        picked.sort_unstable();
        picked
    }
}

/// Groupe 4 : les têtes de la fréquence, complétées par des numéros absents.
pub struct HybridStrategy;

impl HybridStrategy {
    fn top_count(zone: Zone) -> usize {
        match zone {
            Zone::Front => 2,
            Zone::Back => 1,
        }
    }
}

impl GroupStrategy for HybridStrategy {
    fn group(&self) -> u8 {
        4
    }

    fn name(&self) -> &str {
        "Hybride"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let stats = input.window.zone(zone);
        let n = zone.pick_count();

        let mut picked = select_by_extreme_count(&stats.counts, Self::top_count(zone), Extreme::Most, false, rng);

        let mut absent: Vec<u8> = exclude(zone, &stats.seen)
            .into_iter()
            .filter(|x| !picked.contains(x))
            .collect();
        absent.shuffle(rng);
        let missing = n - picked.len();
        picked.extend(absent.into_iter().take(missing));

        // À l'arrière, pool d'absents vide : le moins sorti parmi les vus
        if zone == Zone::Back && picked.len() < n {
            pad_from_count_tiers(&mut picked, stats, n, rng);
        }
        pad_in_domain_order(&mut picked, zone, n);
        picked.sort_unstable();
        picked
    }
}

/// Groupe 5 : numéros qu'aucun des groupes 1 à 4 n'a retenus.
pub struct UnionExclusionStrategy;

impl GroupStrategy for UnionExclusionStrategy {
    fn group(&self) -> u8 {
        5
    }

    fn name(&self) -> &str {
        "Hors groupes 1-4"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let used: BTreeSet<u8> = input
            .earlier(4)
            .flat_map(|g| zone.numbers_of(g).iter().copied())
            .collect();
        sample_exactly(&exclude(zone, &used), zone, zone.pick_count(), rng)
    }
}

/// Groupe 6 : les numéros les plus repris par les groupes 1 à 4.
pub struct IntraSetStrategy;

impl GroupStrategy for IntraSetStrategy {
    fn group(&self) -> u8 {
        6
    }

    fn name(&self) -> &str {
        "Fréquence intra-groupes"
    }

    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
        let counts = FrequencyTable::from_numbers(zone, input.earlier(4).flat_map(|g| zone.numbers_of(g)));
        select_by_extreme_count(&counts, zone.pick_count(), Extreme::Most, false, rng)
    }
}

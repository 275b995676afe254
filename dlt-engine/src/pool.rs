use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use dlt_db::models::Zone;

use crate::frequency::{FrequencyTable, ZoneStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Most,
    Least,
}

/// Domaine de la zone privé de `excluded`, croissant.
pub fn exclude(zone: Zone, excluded: &BTreeSet<u8>) -> Vec<u8> {
    zone.domain().filter(|n| !excluded.contains(n)).collect()
}

/// Les `n` numéros au compte extrême.
///
/// Les ex aequo au compte extrême sont mélangés avant d'être retenus. S'il en
/// manque, le reste du domaine (restreint aux numéros vus si `only_if_seen`)
/// complète par compte décroissant (`Most`) ou croissant (`Least`).
pub fn select_by_extreme_count(
    counts: &FrequencyTable,
    n: usize,
    mode: Extreme,
    only_if_seen: bool,
    rng: &mut StdRng,
) -> Vec<u8> {
    let mut eligible: Vec<u8> = counts
        .zone()
        .domain()
        .filter(|&x| !only_if_seen || counts.get(x) > 0)
        .collect();

    let extreme = match mode {
        Extreme::Most => eligible.iter().map(|&x| counts.get(x)).max(),
        Extreme::Least => eligible.iter().map(|&x| counts.get(x)).min(),
    };
    let Some(extreme) = extreme else {
        return Vec::new();
    };

    let mut ties: Vec<u8> = eligible.iter().copied().filter(|&x| counts.get(x) == extreme).collect();
    ties.shuffle(rng);
    ties.truncate(n);
    let mut selected = ties;

    if selected.len() < n {
        eligible.retain(|x| !selected.contains(x));
        match mode {
            Extreme::Most => eligible.sort_by_key(|&x| std::cmp::Reverse(counts.get(x))),
            Extreme::Least => eligible.sort_by_key(|&x| counts.get(x)),
        }
        let missing = n - selected.len();
        selected.extend(eligible.into_iter().take(missing));
    }

    selected.sort_unstable();
    selected
}

/// Regroupe `candidates` par compte, du plus petit au plus grand.
pub fn count_tiers(counts: &FrequencyTable, candidates: impl IntoIterator<Item = u8>) -> Vec<Vec<u8>> {
    let mut tiers: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
    for n in candidates {
        tiers.entry(counts.get(n)).or_default().push(n);
    }
    tiers.into_values().collect()
}

/// Numéros vus au compte le plus faible.
pub fn least_frequent_seen(stats: &ZoneStats) -> Vec<u8> {
    count_tiers(&stats.counts, stats.seen.iter().copied())
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Numéros vus au deuxième compte distinct le plus faible.
pub fn second_least_frequent_seen(stats: &ZoneStats) -> Vec<u8> {
    count_tiers(&stats.counts, stats.seen.iter().copied())
        .into_iter()
        .nth(1)
        .unwrap_or_default()
}

/// Complète `selected` jusqu'à `n` en puisant parmi les numéros vus, palier de
/// compte par palier de compte (le plus faible d'abord), au hasard dans chaque palier.
pub fn pad_from_count_tiers(selected: &mut Vec<u8>, stats: &ZoneStats, n: usize, rng: &mut StdRng) {
    let candidates = stats.seen.iter().copied().filter(|x| !selected.contains(x));
    for mut tier in count_tiers(&stats.counts, candidates) {
        tier.shuffle(rng);
        for number in tier {
            if selected.len() >= n {
                return;
            }
            selected.push(number);
        }
    }
}

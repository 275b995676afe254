use std::collections::BTreeSet;

use dlt_db::models::{DrawRecord, Zone};

use crate::history::recent;

/// Comptage dense par numéro : index 0 = numéro 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    zone: Zone,
    counts: Vec<u32>,
}

impl FrequencyTable {
    pub fn new(zone: Zone) -> Self {
        Self { zone, counts: vec![0; zone.size()] }
    }

    pub fn from_numbers<'a, I>(zone: Zone, numbers: I) -> Self
    where
        I: IntoIterator<Item = &'a u8>,
    {
        let mut table = Self::new(zone);
        for &n in numbers {
            table.bump(n);
        }
        table
    }

    pub fn from_draws(zone: Zone, draws: &[DrawRecord]) -> Self {
        Self::from_numbers(zone, draws.iter().flat_map(|d| zone.numbers_from(d)))
    }

    fn bump(&mut self, n: u8) {
        if zone_index(self.zone, n).is_some() {
            self.counts[(n - 1) as usize] += 1;
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn get(&self, n: u8) -> u32 {
        zone_index(self.zone, n).map(|i| self.counts[i]).unwrap_or(0)
    }

    /// Numéros dont le compte est non nul, croissants.
    pub fn seen(&self) -> BTreeSet<u8> {
        self.zone.domain().filter(|&n| self.get(n) > 0).collect()
    }

    /// `(numéro, compte)` des numéros vus, du plus fréquent au moins fréquent ;
    /// à compte égal, le plus petit numéro d'abord.
    pub fn ranked(&self) -> Vec<(u8, u32)> {
        let mut ranked: Vec<(u8, u32)> = self
            .zone
            .domain()
            .map(|n| (n, self.get(n)))
            .filter(|&(_, count)| count > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

fn zone_index(zone: Zone, n: u8) -> Option<usize> {
    zone.contains(n).then(|| (n - 1) as usize)
}

#[derive(Debug, Clone)]
pub struct ZoneStats {
    pub counts: FrequencyTable,
    pub seen: BTreeSet<u8>,
}

impl ZoneStats {
    pub fn from_draws(zone: Zone, draws: &[DrawRecord]) -> Self {
        let counts = FrequencyTable::from_draws(zone, draws);
        let seen = counts.seen();
        Self { counts, seen }
    }

    pub fn zone(&self) -> Zone {
        self.counts.zone()
    }
}

/// Statistiques avant/arrière sur une tranche d'historique.
#[derive(Debug, Clone)]
pub struct WindowStats {
    pub front: ZoneStats,
    pub back: ZoneStats,
}

impl WindowStats {
    /// Les `window` derniers tirages exploitables.
    pub fn near(history: &[DrawRecord], window: usize) -> Self {
        Self::full(recent(history, window))
    }

    pub fn full(history: &[DrawRecord]) -> Self {
        Self {
            front: ZoneStats::from_draws(Zone::Front, history),
            back: ZoneStats::from_draws(Zone::Back, history),
        }
    }

    pub fn zone(&self, zone: Zone) -> &ZoneStats {
        match zone {
            Zone::Front => &self.front,
            Zone::Back => &self.back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::make_test_history;

    #[test]
    fn test_identical_draws_window_counts() {
        let history: Vec<DrawRecord> = (0..10)
            .map(|i| DrawRecord::new(format!("{i}"), "2025-01-01", [1, 2, 3, 4, 5], [1, 2]))
            .collect();
        let stats = WindowStats::near(&history, 10);

        for n in 1..=35u8 {
            let expected = if n <= 5 { 10 } else { 0 };
            assert_eq!(stats.front.counts.get(n), expected, "numéro avant {n}");
        }
        for n in 1..=12u8 {
            let expected = if n <= 2 { 10 } else { 0 };
            assert_eq!(stats.back.counts.get(n), expected, "numéro arrière {n}");
        }
        assert_eq!(stats.front.seen, (1..=5).collect());
        assert_eq!(stats.back.seen, (1..=2).collect());
    }

    #[test]
    fn test_near_window_only_scans_tail() {
        // bases 0..5 : aucun numéro avant au-delà de 30, aucun 12 à l'arrière
        let mut history = make_test_history(6);
        history.insert(0, DrawRecord::new("old", "2024-12-31", [31, 32, 33, 34, 35], [11, 12]));

        let near = WindowStats::near(&history, 6);
        let full = WindowStats::full(&history);
        assert_eq!(near.front.counts.get(35), 0);
        assert_eq!(full.front.counts.get(35), 1);
        assert!(!near.back.seen.contains(&12));
    }

    #[test]
    fn test_ranked_by_count_then_number() {
        let history = vec![
            DrawRecord::new("1", "2025-01-01", [7, 2, 3, 4, 5], [9, 1]),
            DrawRecord::new("2", "2025-01-03", [7, 2, 30, 31, 32], [9, 4]),
            DrawRecord::new("3", "2025-01-05", [7, 20, 30, 33, 34], [9, 1]),
        ];
        let stats = WindowStats::near(&history, 10);

        let front = stats.front.counts.ranked();
        assert_eq!(&front[..3], &[(7, 3), (2, 2), (30, 2)]);
        assert_eq!(front.len(), 11);
        assert!(front.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(front[3], (3, 1));

        assert_eq!(stats.back.counts.ranked(), vec![(9, 3), (1, 2), (4, 1)]);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let table = FrequencyTable::from_numbers(Zone::Back, &[0, 13, 5, 5]);
        assert_eq!(table.get(5), 2);
        assert_eq!(table.get(13), 0);
        assert_eq!(table.seen().len(), 1);
    }
}

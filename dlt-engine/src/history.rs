use dlt_db::models::DrawRecord;

/// Tirages exploitables : les tirages bloqués sont retirés, l'ordre (ancien → récent) est conservé.
pub fn usable_history(records: &[DrawRecord]) -> Vec<DrawRecord> {
    records.iter().filter(|r| !r.blocked).cloned().collect()
}

/// Les `window` derniers tirages (ou moins si l'historique est court).
pub fn recent(history: &[DrawRecord], window: usize) -> &[DrawRecord] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

#[cfg(test)]
pub(crate) fn make_test_history(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .map(|i| {
            let base = (i % 7) as u8;
            DrawRecord::new(
                format!("25{:03}", i + 1),
                format!("2025-01-{:02}", (i % 28) + 1),
                [base * 5 + 1, base * 5 + 3, base * 5 + 2, base * 5 + 5, base * 5 + 4],
                [base % 12 + 1, (base + 5) % 12 + 1],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_history_drops_blocked() {
        let mut records = make_test_history(4);
        records[1].blocked = true;
        records[3].blocked = true;

        let usable = usable_history(&records);
        let ids: Vec<&str> = usable.iter().map(|r| r.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["25001", "25003"]);
    }

    #[test]
    fn test_usable_history_all_blocked() {
        let mut records = make_test_history(3);
        for r in &mut records {
            r.blocked = true;
        }
        assert!(usable_history(&records).is_empty());
    }

    #[test]
    fn test_recent_window() {
        let history = make_test_history(15);
        assert_eq!(recent(&history, 10).len(), 10);
        assert_eq!(recent(&history, 10)[0].issue_id, "25006");
        assert_eq!(recent(&history[..3], 10).len(), 3);
    }
}

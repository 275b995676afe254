use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use dlt_db::rusqlite::Connection;
use std::path::Path;

use dlt_db::db::replace_draws;
use dlt_db::models::{DrawRecord, validate_draw};

const HEADER: [&str; 9] = ["issue", "date", "f1", "f2", "f3", "f4", "f5", "b1", "b2"];

/// Date ISO ; le format JJ/MM/AAAA est aussi accepté.
pub fn parse_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    if record.len() != HEADER.len() {
        bail!("{} colonnes au lieu de {}", record.len(), HEADER.len());
    }

    let get = |idx: usize| {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' ({})", s, HEADER[idx]))
    };

    let issue_id = get(0)?;
    if issue_id.is_empty() {
        bail!("Numéro de tirage vide");
    }
    let date = parse_date(get(1)?)?;

    let front: [u8; 5] = [get_u8(2)?, get_u8(3)?, get_u8(4)?, get_u8(5)?, get_u8(6)?];
    let back: [u8; 2] = [get_u8(7)?, get_u8(8)?];
    validate_draw(&front, &back)?;

    Ok(DrawRecord::new(issue_id, date, front, back))
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub total_records: u32,
    pub imported: u32,
    pub duplicates: u32,
    pub errors: Vec<String>,
}

/// Lit un CSV `issue,date,f1..f5,b1,b2` ; les lignes invalides sont listées
/// dans `errors` et ignorées.
pub fn read_csv(path: &Path) -> Result<(Vec<DrawRecord>, ImportResult)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut result = ImportResult::default();
    let mut draws = Vec::new();

    for record_result in reader.records() {
        result.total_records += 1;
        let line = result.total_records + 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => draws.push(draw),
                Err(e) => result.errors.push(format!("ligne {}: {:#}", line, e)),
            },
            Err(e) => result.errors.push(format!("ligne {}: {}", line, e)),
        }
    }

    Ok((draws, result))
}

/// Remplace l'historique par le contenu du CSV, si au moins une ligne est valide.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let (draws, mut result) = read_csv(path)?;
    for e in &result.errors {
        log::warn!("Import: {}", e);
    }
    if draws.is_empty() {
        log::warn!("Import: aucune ligne valide, historique conservé");
        return Ok(result);
    }

    let inserted = replace_draws(conn, &draws)? as u32;
    result.imported = inserted;
    result.duplicates = draws.len() as u32 - inserted;
    Ok(result)
}

pub fn export_csv(draws: &[DrawRecord], path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    writer.write_record(HEADER)?;
    for draw in draws {
        let mut row = vec![draw.issue_id.clone(), draw.date.clone()];
        row.extend(draw.front.iter().chain(draw.back.iter()).map(|n| n.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush().context("Échec de l'écriture du CSV")?;
    Ok(draws.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlt_db::db::{fetch_draws, migrate};
    use std::io::Write;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-04-12").unwrap(), "2025-04-12");
        assert_eq!(parse_date("17/02/2026").unwrap(), "2026-02-17");
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("hier").is_err());
    }

    #[test]
    fn test_import_skips_bad_rows() {
        let file = write_csv(
            "issue,date,f1,f2,f3,f4,f5,b1,b2\n\
             25001,2025-01-01,1,2,3,4,5,1,2\n\
             25002,2025-01-03,1,2,3,4,36,1,2\n\
             25003,2025-01-05,6,7,8,9\n\
             25004,2025-01-07,10,11,12,13,14,3,3\n\
             25005,2025-01-09,15,16,17,18,19,4,5\n",
        );
        let conn = memory_db();
        let result = import_csv(&conn, file.path()).unwrap();

        assert_eq!(result.total_records, 5);
        assert_eq!(result.imported, 2);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].starts_with("ligne 3"), "{:?}", result.errors);

        let ids: Vec<String> = fetch_draws(&conn).unwrap().into_iter().map(|d| d.issue_id).collect();
        assert_eq!(ids, vec!["25001", "25005"]);
    }

    #[test]
    fn test_import_without_valid_row_keeps_history() {
        let conn = memory_db();
        dlt_db::db::insert_draw(&conn, &DrawRecord::new("1", "2025-01-01", [1, 2, 3, 4, 5], [1, 2])).unwrap();

        let file = write_csv("issue,date,f1,f2,f3,f4,f5,b1,b2\nx,pas une date,1,2,3,4,5,1,2\n");
        let result = import_csv(&conn, file.path()).unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(fetch_draws(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_import_replaces_and_counts_duplicates() {
        let conn = memory_db();
        dlt_db::db::insert_draw(&conn, &DrawRecord::new("old", "2024-12-31", [1, 2, 3, 4, 5], [1, 2])).unwrap();

        let file = write_csv(
            "issue,date,f1,f2,f3,f4,f5,b1,b2\n\
             25001,2025-01-01,1,2,3,4,5,1,2\n\
             25001,2025-01-01,1,2,3,4,5,1,2\n",
        );
        let result = import_csv(&conn, file.path()).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.duplicates, 1);
        let draws = fetch_draws(&conn).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].issue_id, "25001");
    }

    #[test]
    fn test_export_then_import_keeps_stored_order() {
        let draws = vec![
            DrawRecord::new("25001", "2025-01-01", [9, 1, 30, 4, 12], [7, 2]),
            DrawRecord::new("25002", "2025-01-03", [35, 34, 2, 20, 10], [12, 11]),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        assert_eq!(export_csv(&draws, &path).unwrap(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("issue,date,f1,f2,f3,f4,f5,b1,b2\n"));
        assert!(content.contains("25001,2025-01-01,9,1,30,4,12,7,2\n"));

        let (read, result) = read_csv(&path).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(read, draws);
    }
}

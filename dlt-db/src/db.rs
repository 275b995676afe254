use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::{
    BlockSet, DrawRecord, GROUP_COUNT, GenerationRecord, MAX_GENERATION_RECORDS, PrizeRecord, PrizeTier,
    ScoreBoard,
};

pub const STATE_CONFIRMED: &str = "confirmed";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id  TEXT NOT NULL UNIQUE,
    date      TEXT NOT NULL,
    front_1   INTEGER NOT NULL,
    front_2   INTEGER NOT NULL,
    front_3   INTEGER NOT NULL,
    front_4   INTEGER NOT NULL,
    front_5   INTEGER NOT NULL,
    back_1    INTEGER NOT NULL,
    back_2    INTEGER NOT NULL,
    blocked   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS blocked_groups (
    group_no  INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS group_scores (
    group_no         INTEGER PRIMARY KEY,
    score            INTEGER NOT NULL DEFAULT 0,
    best_tier        INTEGER,
    best_tier_count  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS prize_history (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    group_no  INTEGER NOT NULL,
    issue_id  TEXT NOT NULL,
    tier      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS app_state (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS generation_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at  TEXT NOT NULL,
    text        TEXT NOT NULL
);
";

const DRAW_COLUMNS: &str =
    "issue_id, date, front_1, front_2, front_3, front_4, front_5, back_1, back_2, blocked";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("dlt.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn draw_from_row(row: &Row<'_>) -> rusqlite::Result<DrawRecord> {
    Ok(DrawRecord {
        issue_id: row.get(0)?,
        date: row.get(1)?,
        front: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
        ],
        back: [
            row.get::<_, u8>(7)?,
            row.get::<_, u8>(8)?,
        ],
        blocked: row.get(9)?,
    })
}

pub fn insert_draw(conn: &Connection, draw: &DrawRecord) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (issue_id, date, front_1, front_2, front_3, front_4, front_5, back_1, back_2, blocked)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            draw.issue_id,
            draw.date,
            draw.front[0],
            draw.front[1],
            draw.front[2],
            draw.front[3],
            draw.front[4],
            draw.back[0],
            draw.back[1],
            draw.blocked,
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Tout l'historique, du plus ancien au plus récent (ordre d'insertion).
pub fn fetch_draws(conn: &Connection) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(&format!("SELECT {DRAW_COLUMNS} FROM draws ORDER BY seq ASC"))?;
    let draws = stmt.query_map([], draw_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Les `limit` derniers tirages, le plus récent en premier.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(&format!("SELECT {DRAW_COLUMNS} FROM draws ORDER BY seq DESC LIMIT ?1"))?;
    let draws = stmt.query_map([limit], draw_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn find_draw(conn: &Connection, issue_id: &str) -> Result<Option<DrawRecord>> {
    let draw = conn
        .query_row(
            &format!("SELECT {DRAW_COLUMNS} FROM draws WHERE issue_id = ?1"),
            [issue_id],
            draw_from_row,
        )
        .optional()?;
    Ok(draw)
}

pub fn set_draw_blocked(conn: &Connection, issue_id: &str, blocked: bool) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE draws SET blocked = ?1 WHERE issue_id = ?2",
            rusqlite::params![blocked, issue_id],
        )
        .context("Échec de la mise à jour du tirage")?;
    Ok(changed > 0)
}

pub fn delete_draw(conn: &Connection, issue_id: &str) -> Result<bool> {
    let changed = conn
        .execute("DELETE FROM draws WHERE issue_id = ?1", [issue_id])
        .context("Échec de la suppression")?;
    Ok(changed > 0)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

/// Remplace tout l'historique (import CSV). Retourne le nombre de tirages insérés.
pub fn replace_draws(conn: &Connection, draws: &[DrawRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    tx.execute("DELETE FROM draws", [])?;
    let mut inserted = 0;
    for draw in draws {
        if insert_draw(&tx, draw)? {
            inserted += 1;
        }
    }
    tx.commit().context("Échec du commit")?;
    Ok(inserted)
}

pub fn load_block_set(conn: &Connection) -> Result<BlockSet> {
    let mut stmt = conn.prepare("SELECT group_no FROM blocked_groups ORDER BY group_no")?;
    let groups = stmt.query_map([], |row| row.get::<_, u8>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(groups.into_iter().collect())
}

pub fn save_block_set(conn: &Connection, blocked: &BlockSet) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM blocked_groups", [])?;
    for group in blocked.iter() {
        tx.execute("INSERT INTO blocked_groups (group_no) VALUES (?1)", [group])?;
    }
    tx.commit().context("Échec de l'enregistrement des groupes bloqués")?;
    Ok(())
}

pub fn load_score_board(conn: &Connection) -> Result<ScoreBoard> {
    let mut board = ScoreBoard::default();

    let mut stmt = conn.prepare("SELECT group_no, score, best_tier, best_tier_count FROM group_scores")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u8>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Option<u8>>(2)?,
            row.get::<_, u32>(3)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    for (group_no, score, best_tier, best_tier_count) in rows {
        if let Some(entry) = board.group_mut(group_no) {
            entry.score = score;
            entry.best_tier = best_tier.and_then(PrizeTier::from_level);
            entry.best_tier_count = best_tier_count;
        }
    }

    let mut stmt = conn.prepare("SELECT group_no, issue_id, tier FROM prize_history ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u8>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u8>(2)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    for (group_no, issue_id, tier) in rows {
        // Lignes corrompues ignorées
        let (Some(entry), Some(tier)) = (board.group_mut(group_no), PrizeTier::from_level(tier)) else {
            continue;
        };
        entry.history.push(PrizeRecord { issue_id, tier });
    }

    Ok(board)
}

pub fn save_score_board(conn: &Connection, board: &ScoreBoard) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    write_score_board(&tx, board)?;
    tx.commit().context("Échec de l'enregistrement des scores")?;
    Ok(())
}

/// Enregistre les scores et lève la confirmation dans une même transaction.
pub fn save_settlement(conn: &Connection, board: &ScoreBoard) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    write_score_board(&tx, board)?;
    tx.execute("DELETE FROM app_state WHERE key = ?1", [STATE_CONFIRMED])?;
    tx.commit().context("Échec de l'enregistrement du résultat")?;
    Ok(())
}

fn write_score_board(conn: &Connection, board: &ScoreBoard) -> Result<()> {
    conn.execute("DELETE FROM group_scores", [])?;
    conn.execute("DELETE FROM prize_history", [])?;

    for (idx, entry) in board.groups.iter().enumerate().take(GROUP_COUNT as usize) {
        let group_no = (idx + 1) as u8;
        conn.execute(
            "INSERT INTO group_scores (group_no, score, best_tier, best_tier_count) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                group_no,
                entry.score,
                entry.best_tier.map(|t| t.level()),
                entry.best_tier_count,
            ],
        )?;
        for record in &entry.history {
            conn.execute(
                "INSERT INTO prize_history (group_no, issue_id, tier) VALUES (?1, ?2, ?3)",
                rusqlite::params![group_no, record.issue_id, record.tier.level()],
            )?;
        }
    }
    Ok(())
}

pub fn get_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM app_state WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

pub fn set_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    ).with_context(|| format!("Échec de l'enregistrement de '{}'", key))?;
    Ok(())
}

pub fn clear_state(conn: &Connection, key: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM app_state WHERE key = ?1", [key])?;
    Ok(changed > 0)
}

/// Ajoute une génération et ne garde que les [`MAX_GENERATION_RECORDS`] plus récentes.
pub fn insert_generation_record(conn: &Connection, created_at: &str, text: &str) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO generation_records (created_at, text) VALUES (?1, ?2)",
        [created_at, text],
    ).context("Échec de l'enregistrement de la génération")?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "DELETE FROM generation_records WHERE id NOT IN
         (SELECT id FROM generation_records ORDER BY id DESC LIMIT ?1)",
        [MAX_GENERATION_RECORDS as i64],
    )?;
    tx.commit().context("Échec du commit")?;
    Ok(id)
}

/// Générations conservées, de la plus ancienne à la plus récente.
pub fn fetch_generation_records(conn: &Connection) -> Result<Vec<GenerationRecord>> {
    let mut stmt = conn.prepare("SELECT id, created_at, text FROM generation_records ORDER BY id ASC")?;
    let records = stmt.query_map([], |row| {
        Ok(GenerationRecord {
            id: row.get(0)?,
            created_at: row.get(1)?,
            text: row.get(2)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

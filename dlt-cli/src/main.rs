mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use dlt_db::db::{
    STATE_CONFIRMED, clear_state, count_draws, db_path, delete_draw, fetch_draws, fetch_generation_records,
    fetch_last_draws, find_draw, get_state, insert_draw, insert_generation_record, load_block_set,
    load_score_board, migrate, open_db, save_block_set, save_score_board, save_settlement,
    set_draw_blocked, set_state,
};
use dlt_db::models::{DrawRecord, GROUP_COUNT, GenerationRecord, GroupResult, ScoreBoard, validate_draw};
use dlt_db::rusqlite::Connection;
use dlt_engine::config::{EngineConfig, load_config, save_config};
use dlt_engine::engine::generate_all;
use dlt_engine::format::parse_display;
use dlt_engine::frequency::WindowStats;
use dlt_engine::history::usable_history;
use dlt_engine::scoring::{SettlementReport, settle};

use crate::display::{
    display_confirmed, display_draws, display_generation, display_generation_records, display_import_summary,
    display_record, display_rules, display_scores, display_settlement, display_stats,
};

#[derive(Parser)]
#[command(name = "dlt", about = "Générateur multi-stratégies pour le Super Lotto (DLT)")]
struct Cli {
    /// Chemin de la base SQLite
    #[arg(long, env = "DLT_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remplacer l'historique par un fichier CSV
    Import {
        /// Chemin vers le fichier CSV (issue,date,f1..f5,b1,b2)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Exporter l'historique en CSV
    Export {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Numéros sortis sur les derniers tirages, par fréquence décroissante
    Stats {
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Ajouter un tirage (les champs absents sont demandés)
    Add {
        #[arg(long)]
        issue: Option<String>,

        /// Date (AAAA-MM-JJ ou JJ/MM/AAAA)
        #[arg(long)]
        date: Option<String>,

        /// 5 numéros avant
        #[arg(long, num_args = 5)]
        front: Option<Vec<u8>>,

        /// 2 numéros arrière
        #[arg(long, num_args = 2)]
        back: Option<Vec<u8>>,
    },

    /// Supprimer un tirage
    Delete { issue: String },

    /// Exclure un tirage de la génération
    BlockDraw { issue: String },

    /// Réintégrer un tirage exclu
    UnblockDraw { issue: String },

    /// Générer les 13 grilles
    Generate {
        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Sortie JSON
        #[arg(long)]
        json: bool,

        /// Configuration du moteur (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Écrire la configuration par défaut du moteur (JSON)
    InitConfig {
        #[arg(short, long, default_value = "dlt-config.json")]
        file: PathBuf,
    },

    /// Lister les générations enregistrées, ou en afficher une
    Records {
        /// Numéro de la génération à afficher
        #[arg(short, long)]
        show: Option<usize>,
    },

    /// Confirmer une génération (la plus récente par défaut)
    Confirm {
        /// Numéro de la génération (voir : dlt records)
        #[arg(short, long)]
        record: Option<usize>,
    },

    /// Annuler la confirmation en attente
    Unconfirm,

    /// Calculer les gains des grilles confirmées sur un tirage enregistré
    Settle { issue: String },

    /// Afficher les scores cumulés par groupe
    Scores,

    /// Afficher les règles, en bloquer ou en débloquer une
    Rules {
        #[command(subcommand)]
        action: Option<RuleAction>,
    },

    /// Remettre tous les scores à zéro
    ResetScores {
        /// Ne pas demander de confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RuleAction {
    /// Bloquer un groupe (1-13)
    Block { group: u8 },
    /// Débloquer un groupe (1-13)
    Unblock { group: u8 },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(db_path);
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::Export { file } => cmd_export(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Stats { last } => cmd_stats(&conn, last),
        Command::List { last } => cmd_list(&conn, last),
        Command::Add { issue, date, front, back } => cmd_add(&conn, issue, date, front, back),
        Command::Delete { issue } => {
            if delete_draw(&conn, &issue)? {
                println!("Tirage {} supprimé.", issue);
            } else {
                println!("Tirage {} introuvable.", issue);
            }
            Ok(())
        }
        Command::BlockDraw { issue } => cmd_set_blocked(&conn, &issue, true),
        Command::UnblockDraw { issue } => cmd_set_blocked(&conn, &issue, false),
        Command::Generate { seed, json, config } => cmd_generate(&conn, seed, json, config.as_deref()),
        Command::InitConfig { file } => {
            save_config(&EngineConfig::default(), &file)?;
            println!("Configuration écrite dans {}", file.display());
            Ok(())
        }
        Command::Records { show } => cmd_records(&conn, show),
        Command::Confirm { record } => {
            let groups = confirm_record(&conn, record)?;
            display_confirmed(&groups);
            println!("\nLes gains seront calculés à l'ajout du prochain tirage.");
            Ok(())
        }
        Command::Unconfirm => {
            if clear_state(&conn, STATE_CONFIRMED)? {
                println!("Confirmation annulée.");
            } else {
                println!("Aucune confirmation en attente.");
            }
            Ok(())
        }
        Command::Settle { issue } => cmd_settle(&conn, &issue),
        Command::Scores => {
            display_scores(&load_score_board(&conn)?, &load_block_set(&conn)?);
            Ok(())
        }
        Command::Rules { action } => cmd_rules(&conn, action),
        Command::ResetScores { yes } => cmd_reset_scores(&conn, yes),
    }
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_export(conn: &Connection, file: &Path) -> Result<()> {
    let draws = fetch_draws(conn)?;
    let n = import::export_csv(&draws, file)?;
    println!("{} tirage(s) exporté(s) vers {}", n, file.display());
    Ok(())
}

fn cmd_stats(conn: &Connection, last: usize) -> Result<()> {
    let history = usable_history(&fetch_draws(conn)?);
    if history.is_empty() {
        println!("Aucun tirage exploitable.");
        return Ok(());
    }
    let stats = WindowStats::near(&history, last);
    display_stats(last.min(history.len()), &stats.front.counts.ranked(), &stats.back.counts.ranked());
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : dlt import --file <csv>");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_add(
    conn: &Connection,
    issue: Option<String>,
    date: Option<String>,
    front: Option<Vec<u8>>,
    back: Option<Vec<u8>>,
) -> Result<()> {
    let interactive = issue.is_none() || date.is_none() || front.is_none() || back.is_none();
    if interactive {
        println!("Ajout d'un tirage\n");
    }

    let issue = match issue {
        Some(i) => i,
        None => prompt("Numéro du tirage (ex: 25042) : ")?,
    };
    let raw_date = match date {
        Some(d) => d,
        None => prompt("Date (AAAA-MM-JJ) : ")?,
    };
    let date = import::parse_date(&raw_date)?;

    let front = match front {
        Some(v) => to_array::<5>(&v).context("Il faut exactement 5 numéros avant")?,
        None => prompt_numbers::<5>("5 numéros avant (séparés par des espaces, 1-35) : ")?,
    };
    let back = match back {
        Some(v) => to_array::<2>(&v).context("Il faut exactement 2 numéros arrière")?,
        None => prompt_numbers::<2>("2 numéros arrière (séparés par un espace, 1-12) : ")?,
    };
    validate_draw(&front, &back)?;

    let draw = DrawRecord::new(issue, date, front, back);

    if interactive {
        println!("\nTirage à insérer :");
        display_draws(std::slice::from_ref(&draw));
        let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
        if confirm.trim().to_lowercase() != "o" {
            println!("Insertion annulée.");
            return Ok(());
        }
    }

    if !insert_draw(conn, &draw)? {
        println!("Ce tirage existe déjà (doublon ignoré).");
        return Ok(());
    }
    println!("Tirage {} inséré.", draw.issue_id);

    // Le tirage reste inséré même si le calcul des gains échoue
    match settle_pending(conn, &draw) {
        Ok(Some(report)) => display_settlement(&report),
        Ok(None) => {}
        Err(e) => {
            log::warn!("Calcul des gains impossible pour {}: {:#}", draw.issue_id, e);
            eprintln!("Calcul des gains impossible : {:#}", e);
        }
    }
    Ok(())
}

fn cmd_set_blocked(conn: &Connection, issue: &str, blocked: bool) -> Result<()> {
    if !set_draw_blocked(conn, issue, blocked)? {
        bail!("Tirage {} introuvable", issue);
    }
    let verb = if blocked { "exclu de" } else { "réintégré dans" };
    println!("Tirage {} {} la génération.", issue, verb);
    Ok(())
}

fn cmd_generate(conn: &Connection, seed: Option<u64>, json: bool, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let records = fetch_draws(conn)?;
    let blocked = load_block_set(conn)?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let result = generate_all(&records, &blocked, &config, &mut rng);

    if result.is_generated() {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        insert_generation_record(conn, &now, &result.display_text)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display_generation(&result, &blocked);
        if result.is_generated() {
            println!("Confirmer ces grilles : dlt confirm");
        }
    }
    Ok(())
}

/// Génération numéro `n` (1 = la plus ancienne conservée), la plus récente par défaut.
fn select_record(records: &[GenerationRecord], n: Option<usize>) -> Result<&GenerationRecord> {
    if records.is_empty() {
        bail!("Aucune grille générée. Lancez d'abord : dlt generate");
    }
    match n {
        None => Ok(&records[records.len() - 1]),
        Some(n) => n
            .checked_sub(1)
            .and_then(|i| records.get(i))
            .with_context(|| format!("Génération {} introuvable (1-{})", n, records.len())),
    }
}

fn cmd_records(conn: &Connection, show: Option<usize>) -> Result<()> {
    let records = fetch_generation_records(conn)?;
    match show {
        None => display_generation_records(&records),
        Some(n) => {
            let record = select_record(&records, Some(n))?;
            display_record(n, record, &parse_display(&record.text)?);
        }
    }
    Ok(())
}

/// Enregistre comme confirmée la génération choisie.
fn confirm_record(conn: &Connection, n: Option<usize>) -> Result<Vec<GroupResult>> {
    let records = fetch_generation_records(conn)?;
    let record = select_record(&records, n)?;
    let groups = parse_display(&record.text)?;
    if groups.len() != GROUP_COUNT as usize {
        bail!("Grilles générées incomplètes ({} groupes)", groups.len());
    }
    set_state(conn, STATE_CONFIRMED, &record.text)?;
    Ok(groups)
}

fn cmd_settle(conn: &Connection, issue: &str) -> Result<()> {
    let draw = find_draw(conn, issue)?
        .with_context(|| format!("Tirage {} introuvable", issue))?;
    match settle_pending(conn, &draw)? {
        Some(report) => display_settlement(&report),
        None => println!("Aucune grille confirmée."),
    }
    Ok(())
}

/// Calcule les gains des grilles confirmées sur `draw`, enregistre les scores
/// et lève la confirmation. `None` s'il n'y avait rien à calculer.
fn settle_pending(conn: &Connection, draw: &DrawRecord) -> Result<Option<SettlementReport>> {
    let Some(confirmed) = get_state(conn, STATE_CONFIRMED)? else {
        return Ok(None);
    };
    let blocked = load_block_set(conn)?;
    let mut board = load_score_board(conn)?;

    let report = settle(&mut board, &confirmed, draw, &blocked)?;
    save_settlement(conn, &board)?;
    Ok(Some(report))
}

fn cmd_rules(conn: &Connection, action: Option<RuleAction>) -> Result<()> {
    let mut blocked = load_block_set(conn)?;
    match action {
        None => {}
        Some(RuleAction::Block { group }) => {
            check_group(group)?;
            blocked.insert(group);
            save_block_set(conn, &blocked)?;
            println!("Groupe {} bloqué.", group);
        }
        Some(RuleAction::Unblock { group }) => {
            check_group(group)?;
            blocked.remove(group);
            save_block_set(conn, &blocked)?;
            println!("Groupe {} débloqué.", group);
        }
    }
    display_rules(&blocked);
    Ok(())
}

fn check_group(group: u8) -> Result<()> {
    if !(1..=GROUP_COUNT).contains(&group) {
        bail!("Groupe {} hors limites (1-{})", group, GROUP_COUNT);
    }
    Ok(())
}

fn cmd_reset_scores(conn: &Connection, yes: bool) -> Result<()> {
    if !yes {
        let confirm = prompt("Remettre tous les scores à zéro ? (o/n) : ")?;
        if confirm.trim().to_lowercase() != "o" {
            println!("Annulé.");
            return Ok(());
        }
    }
    save_score_board(conn, &ScoreBoard::default())?;
    println!("Scores remis à zéro.");
    Ok(())
}

fn to_array<const N: usize>(values: &[u8]) -> Option<[u8; N]> {
    values.try_into().ok()
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers<const N: usize>(msg: &str) -> Result<[u8; N]> {
    loop {
        let input = prompt(msg)?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums.ok().as_deref().and_then(to_array::<N>) {
            Some(arr) => return Ok(arr),
            None => println!("Entrez exactement {} numéros. Réessayez.", N),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlt_db::models::{BlockSet, PrizeTier};
    use dlt_engine::format::render;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn confirmed_text() -> String {
        let mut groups = vec![GroupResult::new(vec![31, 32, 33, 34, 35], vec![11, 12]); 13];
        groups[0] = GroupResult::new(vec![1, 2, 3, 4, 5], vec![1, 2]);
        render(&groups)
    }

    #[test]
    fn test_settle_pending_without_confirmation() {
        let conn = memory_db();
        let draw = DrawRecord::new("25001", "2025-01-01", [1, 2, 3, 4, 5], [1, 2]);
        assert!(settle_pending(&conn, &draw).unwrap().is_none());
        assert_eq!(load_score_board(&conn).unwrap(), ScoreBoard::default());
    }

    #[test]
    fn test_settle_pending_updates_scores_and_clears() {
        let conn = memory_db();
        set_state(&conn, STATE_CONFIRMED, &confirmed_text()).unwrap();
        let mut blocked = BlockSet::new();
        blocked.insert(13);
        save_block_set(&conn, &blocked).unwrap();

        let draw = DrawRecord::new("25001", "2025-01-01", [5, 4, 3, 2, 1], [2, 1]);
        let report = settle_pending(&conn, &draw).unwrap().unwrap();
        assert_eq!(report.lines.len(), 12);
        assert_eq!(report.total_delta, 9_999_998 - 2 * 11);

        let board = load_score_board(&conn).unwrap();
        assert_eq!(board.group(1).unwrap().best_tier, Some(PrizeTier::First));
        assert_eq!(board.group(13).unwrap().score, 0);
        assert!(get_state(&conn, STATE_CONFIRMED).unwrap().is_none());
    }

    #[test]
    fn test_settle_pending_keeps_confirmation_on_bad_text() {
        let conn = memory_db();
        set_state(&conn, STATE_CONFIRMED, "Group 1: front[1, 2, 3, 4, 5] back[1, 2]\n").unwrap();
        let draw = DrawRecord::new("25001", "2025-01-01", [1, 2, 3, 4, 5], [1, 2]);
        assert!(settle_pending(&conn, &draw).is_err());
        assert!(get_state(&conn, STATE_CONFIRMED).unwrap().is_some());
        assert_eq!(load_score_board(&conn).unwrap(), ScoreBoard::default());
    }

    #[test]
    fn test_add_keeps_draw_when_settlement_fails() {
        let conn = memory_db();
        set_state(&conn, STATE_CONFIRMED, "Group 1: front[1, 2, 3, 4, 5] back[1, 2]\n").unwrap();

        let result = cmd_add(
            &conn,
            Some("25001".into()),
            Some("2025-01-01".into()),
            Some(vec![1, 2, 3, 4, 5]),
            Some(vec![1, 2]),
        );
        assert!(result.is_ok());
        assert!(find_draw(&conn, "25001").unwrap().is_some());
        assert!(get_state(&conn, STATE_CONFIRMED).unwrap().is_some());
    }

    #[test]
    fn test_confirm_record_picks_requested_generation() {
        let conn = memory_db();
        assert!(confirm_record(&conn, None).is_err());

        let older = confirmed_text();
        let newer = render(&vec![GroupResult::new(vec![6, 7, 8, 9, 10], vec![3, 4]); 13]);
        insert_generation_record(&conn, "2025-01-01 20:00:00", &older).unwrap();
        insert_generation_record(&conn, "2025-01-02 20:00:00", &newer).unwrap();

        confirm_record(&conn, None).unwrap();
        assert_eq!(get_state(&conn, STATE_CONFIRMED).unwrap().as_deref(), Some(newer.as_str()));

        let groups = confirm_record(&conn, Some(1)).unwrap();
        assert_eq!(groups[0].front, vec![1, 2, 3, 4, 5]);
        assert_eq!(get_state(&conn, STATE_CONFIRMED).unwrap().as_deref(), Some(older.as_str()));

        assert!(confirm_record(&conn, Some(0)).is_err());
        assert!(confirm_record(&conn, Some(3)).is_err());
    }

    #[test]
    fn test_check_group_bounds() {
        assert!(check_group(1).is_ok());
        assert!(check_group(13).is_ok());
        assert!(check_group(0).is_err());
        assert!(check_group(14).is_err());
    }

    #[test]
    fn test_to_array() {
        assert_eq!(to_array::<2>(&[3, 9]), Some([3, 9]));
        assert_eq!(to_array::<5>(&[1, 2, 3]), None);
    }
}

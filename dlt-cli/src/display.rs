use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use dlt_db::models::{BlockSet, DrawRecord, GROUP_COUNT, GenerationRecord, GroupResult, ScoreBoard};
use dlt_engine::engine::GenerationResult;
use dlt_engine::scoring::SettlementReport;

/// Règle affichée pour chaque groupe, index 0 = groupe 1.
pub const GROUP_RULES: [&str; GROUP_COUNT as usize] = [
    "Numéros absents des 10 derniers tirages",
    "Numéros les plus fréquents des 10 derniers tirages",
    "Numéros les moins fréquents (déjà sortis) des 10 derniers tirages",
    "Deux plus fréquents (un à l'arrière) complétés par des absents",
    "Numéros non retenus par les groupes 1 à 4",
    "Numéros les plus repris par les groupes 1 à 4",
    "Chaîne de Markov sur les transitions de tirage à tirage",
    "Fréquence par position avec lissage de Laplace",
    "Réseau neuronal à poids aléatoires sur les 10 derniers tirages",
    "Cycle de réapparition, forme récente et retard",
    "Tirage uniforme",
    "Réaction aux numéros consécutifs du dernier tirage",
    "Numéros les moins repris par les groupes 1 à 12",
];

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tirage", "Date", "Avant", "Arrière", "État"]);

    for draw in draws {
        let mut sorted_front = draw.front;
        sorted_front.sort();
        let mut sorted_back = draw.back;
        sorted_back.sort();

        let state = if draw.blocked {
            Cell::new("bloqué").fg(Color::Red)
        } else {
            Cell::new("actif")
        };

        table.add_row(vec![
            Cell::new(&draw.issue_id),
            Cell::new(&draw.date),
            Cell::new(join_numbers(&sorted_front)),
            Cell::new(join_numbers(&sorted_back)),
            state,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Importés          : {}", result.imported);
    println!("  Doublons ignorés  : {}", result.duplicates);
    if !result.errors.is_empty() {
        println!("  Erreurs           : {}", result.errors.len());
        for e in &result.errors {
            println!("    {}", e);
        }
    }
    if result.imported == 0 {
        println!("Aucune ligne valide : l'historique n'a pas été modifié.");
    }
}

pub fn display_generation(result: &GenerationResult, blocked: &BlockSet) {
    if !result.is_generated() {
        println!("{}", result.display_text);
        return;
    }

    println!("\n🎲 Grilles générées\n");
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Groupe", "Avant", "Arrière", "Règle"]);

    for (i, group) in result.groups.iter().enumerate() {
        let index = (i + 1) as u8;
        let (front, back) = if blocked.contains(index) || group.is_empty() {
            (Cell::new("bloqué").fg(Color::DarkGrey), Cell::new("—").fg(Color::DarkGrey))
        } else {
            (Cell::new(join_numbers(&group.front)), Cell::new(join_numbers(&group.back)).fg(Color::Yellow))
        };
        table.add_row(vec![
            Cell::new(index),
            front,
            back,
            Cell::new(GROUP_RULES[i]),
        ]);
    }
    println!("{table}");
}

fn print_groups(groups: &[GroupResult]) {
    for (i, group) in groups.iter().enumerate() {
        if group.is_empty() {
            println!("  {:2}. bloqué", i + 1);
        } else {
            println!("  {:2}. {}  |  {}", i + 1, join_numbers(&group.front), join_numbers(&group.back));
        }
    }
}

pub fn display_confirmed(groups: &[GroupResult]) {
    println!("Grilles confirmées :");
    print_groups(groups);
}

pub fn display_generation_records(records: &[GenerationRecord]) {
    if records.is_empty() {
        println!("Aucune génération enregistrée.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["N°", "Date", "Groupe 1"]);

    for (i, record) in records.iter().enumerate().rev() {
        let preview = record.text.lines().next().unwrap_or("");
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&record.created_at),
            Cell::new(format!("{preview} ...")),
        ]);
    }
    println!("{table}");
    println!("Détail : dlt records --show <n>    Confirmer : dlt confirm --record <n>");
}

pub fn display_record(number: usize, record: &GenerationRecord, groups: &[GroupResult]) {
    println!("Génération n°{} ({})", number, record.created_at);
    print_groups(groups);
}

fn counts_line(ranked: &[(u8, u32)]) -> String {
    ranked
        .iter()
        .map(|(n, count)| format!("{:2} ({}x)", n, count))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn display_stats(draws: usize, front: &[(u8, u32)], back: &[(u8, u32)]) {
    println!("\n📈 Numéros sortis sur les {} derniers tirages\n", draws);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Zone", "Numéro (sorties)"]);
    table.add_row(vec![Cell::new("Avant"), Cell::new(counts_line(front))]);
    table.add_row(vec![Cell::new("Arrière"), Cell::new(counts_line(back)).fg(Color::Yellow)]);
    println!("{table}");
}

pub fn display_settlement(report: &SettlementReport) {
    println!("\n🏆 Résultats du tirage {}\n", report.issue_id);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Groupe", "Bons numéros", "Rang", "Points"]);

    for line in &report.lines {
        let color = if line.delta > 0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(line.group),
            Cell::new(format!("{} + {}", line.front_hits, line.back_hits)),
            Cell::new(&line.tier),
            Cell::new(format!("{:+}", line.delta)).fg(color),
        ]);
    }
    println!("{table}");
    println!("Total du tirage : {:+}", report.total_delta);
}

pub fn display_scores(board: &ScoreBoard, blocked: &BlockSet) {
    println!("\n📊 Scores cumulés (total : {})\n", board.total());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Groupe", "Score", "Meilleur rang", "Fois", "Derniers gains"]);

    for (i, score) in board.groups.iter().enumerate() {
        let index = (i + 1) as u8;
        let best = match score.best_tier {
            Some(tier) => tier.to_string(),
            None => "—".to_string(),
        };
        let recent = score
            .history
            .iter()
            .rev()
            .take(3)
            .map(|p| format!("{} ({})", p.issue_id, p.tier))
            .collect::<Vec<_>>()
            .join(", ");
        let group_cell = if blocked.contains(index) {
            Cell::new(format!("{index} (bloqué)")).fg(Color::DarkGrey)
        } else {
            Cell::new(index)
        };
        table.add_row(vec![
            group_cell,
            Cell::new(score.score),
            Cell::new(best),
            Cell::new(score.best_tier_count),
            Cell::new(recent),
        ]);
    }
    println!("{table}");
}

pub fn display_rules(blocked: &BlockSet) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Groupe", "Règle", "État"]);

    for (i, rule) in GROUP_RULES.iter().enumerate() {
        let index = (i + 1) as u8;
        let state = if blocked.contains(index) {
            Cell::new("bloqué").fg(Color::Red)
        } else {
            Cell::new("actif").fg(Color::Green)
        };
        table.add_row(vec![Cell::new(index), Cell::new(rule), state]);
    }
    println!("{table}");
}

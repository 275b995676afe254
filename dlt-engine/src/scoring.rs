use anyhow::{Result, bail};
use serde::Serialize;

use dlt_db::models::{BlockSet, DrawRecord, GROUP_COUNT, PrizeRecord, PrizeTier, ScoreBoard};

use crate::format::parse_display;

/// Rang à partir du nombre de bons numéros avant et arrière.
pub fn prize_tier(front_hits: usize, back_hits: usize) -> PrizeTier {
    match (front_hits, back_hits) {
        (5, 2) => PrizeTier::First,
        (5, 1) => PrizeTier::Second,
        (5, 0) => PrizeTier::Third,
        (4, 2) => PrizeTier::Fourth,
        (4, 1) => PrizeTier::Fifth,
        (3, 2) => PrizeTier::Sixth,
        (4, 0) => PrizeTier::Seventh,
        (3, 1) | (2, 2) => PrizeTier::Eighth,
        (3, 0) | (1, 2) | (2, 1) | (0, 2) => PrizeTier::Ninth,
        _ => PrizeTier::NoPrize,
    }
}

/// Variation de score associée à un rang (mise de 2 déduite).
pub fn score_delta(tier: PrizeTier) -> i64 {
    match tier {
        PrizeTier::First => 9_999_998,
        PrizeTier::Second => 99_998,
        PrizeTier::Third => 9_998,
        PrizeTier::Fourth => 2_998,
        PrizeTier::Fifth => 298,
        PrizeTier::Sixth => 198,
        PrizeTier::Seventh => 98,
        PrizeTier::Eighth => 13,
        PrizeTier::Ninth => 3,
        PrizeTier::NoPrize => -2,
    }
}

fn hits(picked: &[u8], winning: &[u8]) -> usize {
    picked.iter().filter(|n| winning.contains(n)).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSettlement {
    pub group: u8,
    pub front_hits: usize,
    pub back_hits: usize,
    pub tier: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub issue_id: String,
    pub lines: Vec<GroupSettlement>,
    pub total_delta: i64,
}

/// Confronte les grilles confirmées au tirage `draw` et met à jour `board`.
///
/// Le texte doit contenir exactement 13 groupes ; sinon rien n'est modifié.
/// Les groupes bloqués ou vides ne comptent pas.
pub fn settle(board: &mut ScoreBoard, confirmed_text: &str, draw: &DrawRecord, blocked: &BlockSet) -> Result<SettlementReport> {
    let groups = parse_display(confirmed_text)?;
    if groups.len() != GROUP_COUNT as usize {
        bail!(
            "Grilles confirmées illisibles : {} groupe(s) trouvé(s), {} attendus",
            groups.len(),
            GROUP_COUNT
        );
    }

    let mut lines = Vec::new();
    let mut total_delta = 0;

    for (i, group) in groups.iter().enumerate() {
        let index = (i + 1) as u8;
        if blocked.contains(index) || group.is_empty() {
            continue;
        }
        let Some(score) = board.group_mut(index) else {
            continue;
        };

        let front_hits = hits(&group.front, &draw.front);
        let back_hits = hits(&group.back, &draw.back);
        let tier = prize_tier(front_hits, back_hits);
        let delta = score_delta(tier);

        score.score += delta;
        total_delta += delta;

        if tier.is_prize() {
            match score.best_tier {
                Some(best) if tier > best => {}
                Some(best) if tier == best => score.best_tier_count += 1,
                _ => {
                    score.best_tier = Some(tier);
                    score.best_tier_count = 1;
                }
            }
            score.history.push(PrizeRecord {
                issue_id: draw.issue_id.clone(),
                tier,
            });
        }

        lines.push(GroupSettlement {
            group: index,
            front_hits,
            back_hits,
            tier: tier.to_string(),
            delta,
        });
    }

    log::info!("Tirage {} : {} groupe(s) évalué(s), total {:+}", draw.issue_id, lines.len(), total_delta);

    Ok(SettlementReport {
        issue_id: draw.issue_id.clone(),
        lines,
        total_delta,
    })
}

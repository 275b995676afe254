use rand::rngs::StdRng;
use serde::Serialize;

use dlt_db::models::{BlockSet, DrawRecord, GroupResult, Zone, zone_is_well_formed};

use crate::config::EngineConfig;
use crate::format::{INSUFFICIENT_DATA_TEXT, render};
use crate::frequency::WindowStats;
use crate::history::usable_history;
use crate::sampler::uniform_pick;
use crate::strategies::{GroupStrategy, StrategyInput, all_strategies};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationStatus {
    Generated,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub status: GenerationStatus,
    pub display_text: String,
    pub groups: Vec<GroupResult>,
}

impl GenerationResult {
    fn insufficient() -> Self {
        Self {
            status: GenerationStatus::InsufficientData,
            display_text: INSUFFICIENT_DATA_TEXT.to_string(),
            groups: Vec::new(),
        }
    }

    pub fn is_generated(&self) -> bool {
        self.status == GenerationStatus::Generated
    }

    pub fn fronts(&self) -> Vec<&[u8]> {
        self.groups.iter().map(|g| g.front.as_slice()).collect()
    }

    pub fn backs(&self) -> Vec<&[u8]> {
        self.groups.iter().map(|g| g.back.as_slice()).collect()
    }
}

/// Sortie d'une stratégie pour une zone, remplacée par un tirage uniforme si
/// elle n'est pas une grille valide.
fn guarded_pick(strategy: &dyn GroupStrategy, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8> {
    let mut numbers = strategy.pick(input, zone, rng);
    numbers.sort_unstable();
    if zone_is_well_formed(&numbers, zone) {
        return numbers;
    }
    log::warn!(
        "Groupe {} ({}) : grille {} invalide {:?}, remplacée par un tirage uniforme",
        strategy.group(),
        strategy.name(),
        zone.label(),
        numbers
    );
    uniform_pick(zone, rng)
}

/// Génère les 13 grilles.
///
/// Les tirages bloqués sont ignorés ; sans aucun tirage exploitable, le
/// résultat porte le statut `InsufficientData` et le texte d'avertissement.
pub fn generate_all(
    records: &[DrawRecord],
    blocked: &BlockSet,
    config: &EngineConfig,
    rng: &mut StdRng,
) -> GenerationResult {
    let history = usable_history(records);
    if history.is_empty() {
        log::info!("Aucun tirage exploitable ({} enregistré(s))", records.len());
        return GenerationResult::insufficient();
    }

    let window = WindowStats::near(&history, config.window);
    let strategies = all_strategies();
    let mut groups: Vec<GroupResult> = Vec::with_capacity(strategies.len());

    for strategy in &strategies {
        if blocked.contains(strategy.group()) {
            groups.push(GroupResult::empty());
            continue;
        }
        let input = StrategyInput {
            history: &history,
            window: &window,
            prior: &groups,
            blocked,
            config,
        };
        let front = guarded_pick(strategy.as_ref(), &input, Zone::Front, rng);
        let back = guarded_pick(strategy.as_ref(), &input, Zone::Back, rng);
        groups.push(GroupResult::new(front, back));
    }

    log::info!(
        "{} grilles générées sur {} tirage(s) exploitable(s), {} groupe(s) bloqué(s)",
        groups.iter().filter(|g| !g.is_empty()).count(),
        history.len(),
        blocked.len()
    );

    GenerationResult {
        status: GenerationStatus::Generated,
        display_text: render(&groups),
        groups,
    }
}

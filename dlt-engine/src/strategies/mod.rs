pub mod basic;
pub mod bayes;
pub mod consecutive;
pub mod generated;
pub mod markov;
pub mod neural;
pub mod random;
pub mod time_series;

use rand::rngs::StdRng;

use dlt_db::models::{BlockSet, DrawRecord, GroupResult, Zone};

use crate::config::EngineConfig;
use crate::frequency::WindowStats;

/// Tout ce qu'une stratégie peut lire pour produire sa grille.
pub struct StrategyInput<'a> {
    /// Historique exploitable, du plus ancien au plus récent.
    pub history: &'a [DrawRecord],
    /// Statistiques sur la fenêtre récente.
    pub window: &'a WindowStats,
    /// Grilles des groupes précédents, index 0 = groupe 1 (vides si bloqués).
    pub prior: &'a [GroupResult],
    pub blocked: &'a BlockSet,
    pub config: &'a EngineConfig,
}

impl<'a> StrategyInput<'a> {
    /// Grilles non bloquées parmi les groupes 1..=`upto` déjà produits.
    pub fn earlier(&self, upto: u8) -> impl Iterator<Item = &'a GroupResult> + '_ {
        self.prior
            .iter()
            .enumerate()
            .take(upto as usize)
            .filter(|(i, g)| !self.blocked.contains((*i + 1) as u8) && !g.is_empty())
            .map(|(_, g)| g)
    }

    pub fn last_draw(&self) -> Option<&'a DrawRecord> {
        self.history.last()
    }
}

pub trait GroupStrategy {
    /// Index du groupe, 1..=13.
    fn group(&self) -> u8;
    fn name(&self) -> &str;
    /// Numéros de la zone (non triés ou triés, l'appelant trie et valide).
    fn pick(&self, input: &StrategyInput<'_>, zone: Zone, rng: &mut StdRng) -> Vec<u8>;
}

/// Les treize stratégies, dans l'ordre d'exécution.
pub fn all_strategies() -> Vec<Box<dyn GroupStrategy>> {
    vec![
        Box::new(basic::ExclusionStrategy),
        Box::new(basic::TopFrequentStrategy),
        Box::new(basic::LeastFrequentStrategy),
        Box::new(basic::HybridStrategy),
        Box::new(basic::UnionExclusionStrategy),
        Box::new(basic::IntraSetStrategy),
        Box::new(markov::MarkovStrategy),
        Box::new(bayes::PositionalBayesStrategy),
        Box::new(neural::FeedForwardStrategy),
        Box::new(time_series::CyclicalStrategy),
        Box::new(random::UniformStrategy),
        Box::new(consecutive::ConsecutiveStrategy),
        Box::new(generated::LeastGeneratedStrategy),
    ]
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;

    /// Données possédées pour construire un `StrategyInput` dans les tests.
    pub struct Fixture {
        pub history: Vec<DrawRecord>,
        pub window: WindowStats,
        pub prior: Vec<GroupResult>,
        pub blocked: BlockSet,
        pub config: EngineConfig,
    }

    impl Fixture {
        pub fn new(history: Vec<DrawRecord>) -> Self {
            let config = EngineConfig::default();
            let window = WindowStats::near(&history, config.window);
            Self {
                history,
                window,
                prior: Vec::new(),
                blocked: BlockSet::new(),
                config,
            }
        }

        pub fn with_prior(mut self, prior: Vec<GroupResult>) -> Self {
            self.prior = prior;
            self
        }

        pub fn with_blocked(mut self, blocked: BlockSet) -> Self {
            self.blocked = blocked;
            self
        }

        pub fn input(&self) -> StrategyInput<'_> {
            StrategyInput {
                history: &self.history,
                window: &self.window,
                prior: &self.prior,
                blocked: &self.blocked,
                config: &self.config,
            }
        }
    }

    pub fn draw(front: [u8; 5], back: [u8; 2]) -> DrawRecord {
        DrawRecord::new("t", "2025-01-01", front, back)
    }
}

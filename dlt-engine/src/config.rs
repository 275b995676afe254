use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dlt_db::models::Zone;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralConfig {
    pub min_history: usize,
    /// Nombre de tirages en entrée du réseau.
    pub input_draws: usize,
    pub hidden_front: usize,
    pub hidden_back: usize,
    pub weight_mean: f64,
    pub weight_std: f64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            min_history: 10,
            input_draws: 10,
            hidden_front: 20,
            hidden_back: 8,
            weight_mean: 0.1,
            weight_std: 0.5,
        }
    }
}

impl NeuralConfig {
    pub fn hidden_units(&self, zone: Zone) -> usize {
        match zone {
            Zone::Front => self.hidden_front,
            Zone::Back => self.hidden_back,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fenêtre récente utilisée par les groupes 1-6 et 12.
    pub window: usize,
    pub markov_min_history: usize,
    pub bayes_min_history: usize,
    pub time_series_min_history: usize,
    pub time_series_recent: usize,
    pub neural: NeuralConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: 10,
            markov_min_history: 2,
            bayes_min_history: 1,
            time_series_min_history: 10,
            time_series_recent: 10,
            neural: NeuralConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config: EngineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    Ok(config)
}

pub fn save_config(config: &EngineConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use hexevo_engine::BoardConfig;
use hexevo_evaluator::LinearPolicy;
use hexevo_training::EvolutionStrategy;
use serde::{Deserialize, Serialize};

/// Trained [`LinearPolicy`] as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PolicyModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub board_size: usize,
    pub generations: u64,
    /// Step size of the search distribution when training stopped.
    pub sigma: f64,
    /// Learning rate when training stopped.
    pub rate: f64,
    /// Mean of the search distribution, see [`LinearPolicy`] for the layout.
    pub parameters: Vec<f64>,
}

impl PolicyModel {
    pub fn from_strategy(name: String, board_size: usize, es: &EvolutionStrategy) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            board_size,
            generations: es.generation(),
            sigma: es.sigma(),
            rate: es.rate(),
            parameters: es.mean().to_vec(),
        }
    }

    /// Board configuration matching the model, with `base`'s other settings.
    pub fn board_config(&self, base: BoardConfig) -> BoardConfig {
        BoardConfig {
            size: self.board_size,
            ..base
        }
    }

    pub fn to_policy(&self, config: &BoardConfig) -> anyhow::Result<LinearPolicy> {
        anyhow::ensure!(
            config.size == self.board_size,
            "model {} was trained on {}x{} boards, not {}x{}",
            self.name,
            self.board_size,
            self.board_size,
            config.size,
            config.size
        );
        LinearPolicy::from_parameters(config, &self.parameters)
            .with_context(|| format!("Invalid parameters in model {}", self.name))
    }
}

pub mod decay_config;
pub mod defaults;
pub mod history_config;
pub mod leaderboard_config;
pub mod learning_config;
pub mod normalizer_config;
pub mod observability_config;
pub mod scoring_config;

pub use decay_config::DecayConfig;
pub use history_config::HistoryConfig;
pub use leaderboard_config::{ComponentWeights, LeaderboardConfig};
pub use learning_config::LearningConfig;
pub use normalizer_config::NormalizerConfig;
pub use observability_config::ObservabilityConfig;
pub use scoring_config::{CategoryWeights, ScoringConfig};

use serde::{Deserialize, Serialize};

use crate::errors::{PrismError, PrismResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub scoring: ScoringConfig,
    pub decay: DecayConfig,
    pub learning: LearningConfig,
    pub normalizer: NormalizerConfig,
    pub leaderboard: LeaderboardConfig,
    pub history: HistoryConfig,
    pub observability: ObservabilityConfig,
}

impl PrismConfig {
    /// Load config from a TOML string. Missing fields use defaults.
    pub fn from_toml(toml_str: &str) -> PrismResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| PrismError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no subsystem can work with.
    pub fn validate(&self) -> PrismResult<()> {
        self.scoring
            .category_weights
            .validate()
            .map_err(|e| PrismError::ConfigError(format!("scoring: {e}")))?;
        self.leaderboard
            .component_weights
            .validate()
            .map_err(|e| PrismError::ConfigError(format!("leaderboard: {e}")))?;

        if !(self.decay.decay_period_days > 0.0) {
            return Err(PrismError::ConfigError(format!(
                "decay.decay_period_days must be positive, got {}",
                self.decay.decay_period_days
            )));
        }
        if !(0.0..=1.0).contains(&self.decay.max_degradation) {
            return Err(PrismError::ConfigError(format!(
                "decay.max_degradation must be in [0, 1], got {}",
                self.decay.max_degradation
            )));
        }
        if !(self.learning.learning_rate >= 0.0) || !(0.0..1.0).contains(&self.learning.min_factor_weight) {
            return Err(PrismError::ConfigError(
                "learning.learning_rate must be >= 0 and min_factor_weight in [0, 1)".to_string(),
            ));
        }

        let n = &self.normalizer;
        if n.min_consumer_weight > n.max_consumer_weight || n.min_global_weight > n.max_global_weight {
            return Err(PrismError::ConfigError(
                "normalizer clamp bounds are inverted".to_string(),
            ));
        }
        if !(n.drift_threshold >= 0.0) || !(n.hard_correction_limit > 0.0) {
            return Err(PrismError::ConfigError(
                "normalizer thresholds must be non-negative".to_string(),
            ));
        }

        if self.leaderboard.snapshot_retention == 0 || self.leaderboard.chunk_size == 0 {
            return Err(PrismError::ConfigError(
                "leaderboard.snapshot_retention and chunk_size must be positive".to_string(),
            ));
        }
        if !(self.leaderboard.max_response_ms > 0.0) || self.leaderboard.citation_cap == 0 {
            return Err(PrismError::ConfigError(
                "leaderboard.max_response_ms and citation_cap must be positive".to_string(),
            ));
        }
        if self.history.max_points_per_entity < 2 {
            return Err(PrismError::ConfigError(
                "history.max_points_per_entity must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

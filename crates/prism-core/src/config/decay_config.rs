use serde::{Deserialize, Serialize};

use super::defaults;

/// Temporal decay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Content age (days) at which the full degradation applies.
    pub decay_period_days: f64,
    /// Largest fraction of a score that staleness can remove.
    pub max_degradation: f64,
    /// Recency sensitivity for evaluators without an explicit value.
    pub default_recency_sensitivity: f64,
    /// Performance-delta samples retained per evaluator.
    pub max_samples_per_evaluator: usize,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_period_days: defaults::DEFAULT_DECAY_PERIOD_DAYS,
            max_degradation: defaults::DEFAULT_MAX_DEGRADATION,
            default_recency_sensitivity: defaults::DEFAULT_RECENCY_SENSITIVITY,
            max_samples_per_evaluator: defaults::DEFAULT_MAX_DECAY_SAMPLES,
        }
    }
}

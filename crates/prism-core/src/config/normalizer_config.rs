use serde::{Deserialize, Serialize};

use super::defaults;

/// Weight normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Drift above which a half-correction is applied.
    pub drift_threshold: f64,
    /// Relative deviation reported by `validate_consistency`.
    pub consistency_tolerance: f64,
    /// Drift beyond this is reported as a consistency violation and capped
    /// when computing the correction factor.
    pub hard_correction_limit: f64,
    pub min_consumer_weight: f64,
    pub max_consumer_weight: f64,
    pub min_global_weight: f64,
    pub max_global_weight: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            drift_threshold: defaults::DEFAULT_DRIFT_THRESHOLD,
            consistency_tolerance: defaults::DEFAULT_CONSISTENCY_TOLERANCE,
            hard_correction_limit: defaults::DEFAULT_HARD_CORRECTION_LIMIT,
            min_consumer_weight: defaults::DEFAULT_MIN_CONSUMER_WEIGHT,
            max_consumer_weight: defaults::DEFAULT_MAX_CONSUMER_WEIGHT,
            min_global_weight: defaults::DEFAULT_MIN_GLOBAL_WEIGHT,
            max_global_weight: defaults::DEFAULT_MAX_GLOBAL_WEIGHT,
        }
    }
}

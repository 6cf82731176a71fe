use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every term of a recency adjustment, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayBreakdown {
    pub base_score: f64,
    /// `min(age / decay_period, 1)`.
    pub age_factor: f64,
    pub degradation: f64,
    /// `base_score × (1 − max_degradation)`.
    pub floor: f64,
    pub adjusted_score: f64,
}

/// An old adjusted score against a fresh re-measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceDeltaSample {
    pub evaluator_id: String,
    pub entity_id: String,
    pub previous_score: f64,
    pub remeasured_score: f64,
    pub content_age_days: f64,
    pub recorded_at: DateTime<Utc>,
}

impl PerformanceDeltaSample {
    /// Relative drop from the previous score; negative when it improved.
    pub fn relative_drop(&self) -> f64 {
        if self.previous_score <= 0.0 {
            return 0.0;
        }
        (self.previous_score - self.remeasured_score) / self.previous_score
    }
}

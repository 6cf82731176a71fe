use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one normalization step did to one (consumer, evaluator) weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftCorrection {
    pub evaluator_id: String,
    pub global_weight: f64,
    pub original_weight: f64,
    pub new_weight: f64,
    /// `|consumer − global| / global` before the step.
    pub drift_factor: f64,
    /// `None` when drift was within the threshold and nothing changed.
    pub correction_factor: Option<f64>,
}

/// Drift beyond the hard correction limit. Reported only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftViolation {
    pub consumer_id: String,
    pub evaluator_id: String,
    pub drift: f64,
    pub limit: f64,
}

/// Outcome of normalizing one consumer profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub consumer_id: String,
    pub original_weights: BTreeMap<String, f64>,
    pub new_weights: BTreeMap<String, f64>,
    pub drift_corrections: Vec<DriftCorrection>,
    /// `1 − mean residual drift`, clamped to [0, 1].
    pub confidence: f64,
    pub violations: Vec<DriftViolation>,
    /// Evaluators left as they were because their canonical weight is not
    /// positive, so drift against it is undefined.
    #[serde(default)]
    pub skipped_evaluators: Vec<String>,
    pub normalized_at: DateTime<Utc>,
}

impl NormalizationResult {
    /// Number of weights that were actually corrected.
    pub fn corrected_count(&self) -> usize {
        self.drift_corrections
            .iter()
            .filter(|c| c.correction_factor.is_some())
            .count()
    }
}

/// A (consumer, evaluator) pair deviating beyond the consistency tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub consumer_id: String,
    pub evaluator_id: String,
    pub consumer_weight: f64,
    pub global_weight: f64,
    /// `|consumer − global|`.
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub checked_pairs: usize,
    pub inconsistencies: Vec<Inconsistency>,
    pub checked_at: DateTime<Utc>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// An authoritative change to an evaluator's canonical weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalWeightUpdate {
    pub evaluator_id: String,
    pub previous_weight: f64,
    pub new_weight: f64,
    pub normalized_performance: f64,
    pub sample_count: usize,
    pub consumers_updated: usize,
}

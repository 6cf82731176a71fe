use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FactorWeights;
use crate::constants::DEFAULT_FACTORS;
use crate::errors::WeightError;

/// One scoring perspective, e.g. a single AI engine's ranking tendencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluator {
    pub id: String,
    /// Evaluator family, used by the best-group highlight.
    pub group: String,
    pub base_weight: f64,
    /// Canonical global weight every consumer copy is normalized against.
    pub current_weight: f64,
    /// Mean relative drift of consumer copies at the last normalization.
    pub drift_factor: f64,
    /// Confidence in the current factor weights, [0.0, 1.0].
    pub confidence: f64,
    /// How strongly this evaluator penalizes stale content, >= 0.
    pub recency_sensitivity: f64,
    /// Reference point every learner pass derives from.
    pub base_factor_weights: FactorWeights,
    pub factor_weights: FactorWeights,
    /// Feedback records `factor_weights` were learned from. A learner result
    /// built from fewer records is stale and never written back.
    #[serde(default)]
    pub learned_records: usize,
    pub last_updated: DateTime<Utc>,
}

impl Evaluator {
    /// Create an evaluator at base weight 1.0 and confidence 0.5.
    pub fn new(
        id: impl Into<String>,
        group: impl Into<String>,
        factor_weights: FactorWeights,
        recency_sensitivity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            base_weight: 1.0,
            current_weight: 1.0,
            drift_factor: 0.0,
            confidence: 0.5,
            recency_sensitivity,
            base_factor_weights: factor_weights.clone(),
            factor_weights,
            learned_records: 0,
            last_updated: Utc::now(),
        }
    }

    pub fn with_base_weight(mut self, weight: f64) -> Self {
        self.base_weight = weight;
        self.current_weight = weight;
        self
    }

    /// Change the recency sensitivity. Only ever called explicitly.
    pub fn set_recency_sensitivity(&mut self, sensitivity: f64) -> Result<(), WeightError> {
        WeightError::check_non_negative("recency_sensitivity", sensitivity)?;
        self.recency_sensitivity = sensitivity;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Check every numeric field.
    pub fn validate(&self) -> Result<(), WeightError> {
        WeightError::check_non_negative("base_weight", self.base_weight)?;
        WeightError::check_non_negative("current_weight", self.current_weight)?;
        WeightError::check_non_negative("drift_factor", self.drift_factor)?;
        WeightError::check_range("confidence", self.confidence, 0.0, 1.0)?;
        WeightError::check_non_negative("recency_sensitivity", self.recency_sensitivity)?;
        self.base_factor_weights.validate()?;
        self.factor_weights.validate()?;
        // Learning only rebalances, so both sets must carry the same total.
        let expected = self.base_factor_weights.total();
        let actual = self.factor_weights.total();
        if (expected - actual).abs() > FACTOR_TOTAL_TOLERANCE {
            return Err(WeightError::TotalMismatch {
                name: format!("{}.factor_weights", self.id),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

const FACTOR_TOTAL_TOLERANCE: f64 = 1e-6;

/// Recency sensitivities of the default evaluator set.
const DEFAULT_EVALUATORS: [(&str, &str, f64); 5] = [
    ("chatgpt", "conversational", 0.6),
    ("claude", "conversational", 0.5),
    ("gemini", "search", 0.8),
    ("perplexity", "search", 0.9),
    ("copilot", "assistant", 0.7),
];

/// The evaluator set created at startup.
pub fn default_evaluators() -> Vec<Evaluator> {
    DEFAULT_EVALUATORS
        .iter()
        .map(|(id, group, sensitivity)| {
            Evaluator::new(*id, *group, FactorWeights::equal(&DEFAULT_FACTORS), *sensitivity)
        })
        .collect()
}

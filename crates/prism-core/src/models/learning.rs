use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FactorWeights;

/// A weight change attributed to one change type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightAdjustment {
    pub change_type: String,
    pub factor: String,
    pub average_impact: f64,
    pub sample_count: usize,
    /// `average_impact × learning_rate`.
    pub requested_delta: f64,
    /// What the rebalance could actually apply while conserving the total.
    pub applied_delta: f64,
}

/// Result of one learner pass for one evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningOutcome {
    pub evaluator_id: String,
    pub original_weights: FactorWeights,
    pub new_weights: FactorWeights,
    pub adjustments: Vec<WeightAdjustment>,
    pub data_points: usize,
    pub confidence: f64,
    pub learned_at: DateTime<Utc>,
}

impl LearningOutcome {
    /// A pass that leaves the weights as they are.
    pub fn unchanged(evaluator_id: impl Into<String>, weights: &FactorWeights, confidence: f64) -> Self {
        Self {
            evaluator_id: evaluator_id.into(),
            original_weights: weights.clone(),
            new_weights: weights.clone(),
            adjustments: Vec::new(),
            data_points: 0,
            confidence,
            learned_at: Utc::now(),
        }
    }

    pub fn changed(&self) -> bool {
        self.original_weights != self.new_weights
    }
}

/// How well one remediation strategy moved an evaluator's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEffectiveness {
    pub change_type: String,
    pub average_impact: f64,
    pub applications: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

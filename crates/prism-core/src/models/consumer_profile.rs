use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Evaluator, FactorWeights};

/// A consumer's copy of one evaluator's weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerEvaluatorWeights {
    pub weight: f64,
    pub factors: FactorWeights,
}

/// Consumer-specific derived copy of the canonical weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerWeightProfile {
    pub consumer_id: String,
    /// Evaluator id → copy.
    pub weights: BTreeMap<String, ConsumerEvaluatorWeights>,
    /// Mean consumer/global weight ratio at the last normalization.
    pub normalization_factor: f64,
    pub last_normalized: Option<DateTime<Utc>>,
}

impl ConsumerWeightProfile {
    /// Copy the canonical weights of every evaluator.
    pub fn from_evaluators<'a>(
        consumer_id: impl Into<String>,
        evaluators: impl IntoIterator<Item = &'a Evaluator>,
    ) -> Self {
        let weights = evaluators
            .into_iter()
            .map(|e| {
                (
                    e.id.clone(),
                    ConsumerEvaluatorWeights {
                        weight: e.current_weight,
                        factors: e.factor_weights.clone(),
                    },
                )
            })
            .collect();
        Self {
            consumer_id: consumer_id.into(),
            weights,
            normalization_factor: 1.0,
            last_normalized: None,
        }
    }

    pub fn weight(&self, evaluator_id: &str) -> Option<f64> {
        self.weights.get(evaluator_id).map(|w| w.weight)
    }

    /// Evaluator id → scalar weight.
    pub fn scalar_weights(&self) -> BTreeMap<String, f64> {
        self.weights
            .iter()
            .map(|(id, w)| (id.clone(), w.weight))
            .collect()
    }
}

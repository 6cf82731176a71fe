use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Feedback learner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Records an evaluator needs before its weights are adjusted.
    pub min_data_points: usize,
    /// Average impact a change type must exceed (in magnitude) to count.
    pub significance_threshold: f64,
    /// Scale applied to the average impact before it moves a weight.
    pub learning_rate: f64,
    /// Floor for factors that give weight away during rebalancing.
    pub min_factor_weight: f64,
    /// Run a learner pass from `record_feedback` once enough data exists.
    pub auto_recalibrate: bool,
    /// Let recalibration apply suggested recency sensitivities.
    pub adjust_recency_sensitivity: bool,
    /// Change type → factor name. Unlisted change types map to the factor of the same name.
    pub change_type_aliases: BTreeMap<String, String>,
}

impl LearningConfig {
    /// Factor a change type maps onto.
    pub fn factor_for<'a>(&'a self, change_type: &'a str) -> &'a str {
        self.change_type_aliases
            .get(change_type)
            .map(String::as_str)
            .unwrap_or(change_type)
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_data_points: defaults::DEFAULT_MIN_DATA_POINTS,
            significance_threshold: defaults::DEFAULT_SIGNIFICANCE_THRESHOLD,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            min_factor_weight: defaults::DEFAULT_MIN_FACTOR_WEIGHT,
            auto_recalibrate: defaults::DEFAULT_AUTO_RECALIBRATE,
            adjust_recency_sensitivity: defaults::DEFAULT_ADJUST_RECENCY_SENSITIVITY,
            change_type_aliases: BTreeMap::new(),
        }
    }
}

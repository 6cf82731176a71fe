use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::WeightError;
use crate::models::Category;

/// Fixed weight vector over the score categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub technical: f64,
    pub content: f64,
    pub evaluator_specific: f64,
    pub external_reference: f64,
    pub freshness: f64,
    pub trust: f64,
}

impl CategoryWeights {
    /// Weight for a single category.
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Technical => self.technical,
            Category::Content => self.content,
            Category::EvaluatorSpecific => self.evaluator_specific,
            Category::ExternalReference => self.external_reference,
            Category::Freshness => self.freshness,
            Category::Trust => self.trust,
        }
    }

    /// Sum of all category weights.
    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    /// Every weight must be finite and non-negative, and at least one positive.
    pub fn validate(&self) -> Result<(), WeightError> {
        for category in Category::ALL {
            WeightError::check_non_negative(category.as_str(), self.weight(category))?;
        }
        if self.total() <= 0.0 {
            return Err(WeightError::Empty {
                name: "category_weights".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            technical: defaults::DEFAULT_WEIGHT_TECHNICAL,
            content: defaults::DEFAULT_WEIGHT_CONTENT,
            evaluator_specific: defaults::DEFAULT_WEIGHT_EVALUATOR_SPECIFIC,
            external_reference: defaults::DEFAULT_WEIGHT_EXTERNAL_REFERENCE,
            freshness: defaults::DEFAULT_WEIGHT_FRESHNESS,
            trust: defaults::DEFAULT_WEIGHT_TRUST,
        }
    }
}

/// Score engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weights used to combine category scores into a composite.
    pub category_weights: CategoryWeights,
}

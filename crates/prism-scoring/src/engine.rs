use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use prism_core::config::{CategoryWeights, ScoringConfig};
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{Category, Evaluator, FactorWeights, RawMeasurement};

use crate::composite::{self, CompositeScore};

/// Score of one measurement under one evaluator, before temporal decay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementScore {
    pub evaluator_id: String,
    /// Composite value in [0, 100].
    pub raw_score: f64,
    pub composite: CompositeScore,
    /// Factor-weighted evaluator score, when factor scores were present.
    pub evaluator_specific: Option<f64>,
    /// The category inputs actually combined.
    pub categories: BTreeMap<Category, f64>,
}

/// Composite scorer driven by a fixed category weight vector.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    config: ScoringConfig,
}

impl ScoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn category_weights(&self) -> &CategoryWeights {
        &self.config.category_weights
    }

    /// See [`composite::compute_composite`].
    pub fn compute_composite(
        &self,
        category_scores: &BTreeMap<Category, f64>,
        weights: &CategoryWeights,
    ) -> PrismResult<Option<CompositeScore>> {
        composite::compute_composite(category_scores, weights)
    }

    /// See [`composite::evaluator_score`].
    pub fn evaluator_score(
        &self,
        factor_scores: &BTreeMap<String, f64>,
        weights: &FactorWeights,
    ) -> PrismResult<Option<f64>> {
        composite::evaluator_score(factor_scores, weights)
    }

    /// Score a measurement for one evaluator.
    ///
    /// Factor scores fill the evaluator-specific category through the
    /// evaluator's factor weights, unless the measurement already carries an
    /// explicit evaluator-specific score.
    pub fn score_measurement(
        &self,
        measurement: &RawMeasurement,
        evaluator: &Evaluator,
    ) -> PrismResult<MeasurementScore> {
        if measurement.is_empty() {
            return Err(PrismError::validation(format!(
                "measurement for {} carries no category or factor scores",
                evaluator.id
            )));
        }

        let evaluator_specific =
            composite::evaluator_score(&measurement.factor_scores, &evaluator.factor_weights)?;

        let mut categories = measurement.category_scores.clone();
        if let Some(score) = evaluator_specific {
            categories
                .entry(Category::EvaluatorSpecific)
                .or_insert(score);
        }

        let composite = composite::compute_composite(&categories, &self.config.category_weights)?
            .ok_or_else(|| {
                PrismError::validation(format!(
                    "measurement for {} has no weighted category or known factor",
                    evaluator.id
                ))
            })?;

        debug!(
            evaluator_id = %evaluator.id,
            raw_score = composite.value,
            coverage = composite.coverage,
            "measurement scored"
        );

        Ok(MeasurementScore {
            evaluator_id: evaluator.id.clone(),
            raw_score: composite.value,
            composite,
            evaluator_specific,
            categories,
        })
    }
}

//! FeedbackLearner: implements IWeightLearner.

use prism_core::config::LearningConfig;
use prism_core::constants::WEIGHT_EPSILON;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    Evaluator, FeedbackRecord, LearningOutcome, StrategyEffectiveness, WeightAdjustment,
};
use prism_core::traits::IWeightLearner;
use tracing::{debug, info, instrument};

use crate::aggregation::aggregate_impacts;
use crate::effectiveness;

/// Derives factor weights from recorded remediation outcomes.
///
/// Pipeline: filter records for the evaluator → group applied changes by
/// change type → keep types whose |average impact| clears the significance
/// threshold → shift `average × learning_rate` onto the mapped factor,
/// starting from the base factor weights.
#[derive(Debug, Clone, Default)]
pub struct FeedbackLearner {
    config: LearningConfig,
}

impl FeedbackLearner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LearningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Effectiveness of each change type across `records`.
    pub fn strategy_effectiveness(&self, records: &[FeedbackRecord]) -> Vec<StrategyEffectiveness> {
        effectiveness::strategy_effectiveness(records)
    }

    /// `mean record confidence × min(1, n / (4 × min_data_points))`.
    fn confidence(&self, records: &[&FeedbackRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let n = records.len() as f64;
        let mean = records.iter().map(|r| r.confidence).sum::<f64>() / n;
        let saturation = (4 * self.config.min_data_points.max(1)) as f64;
        (mean * (n / saturation).min(1.0)).clamp(0.0, 1.0)
    }
}

impl IWeightLearner for FeedbackLearner {
    #[instrument(skip(self, evaluator, records), fields(evaluator_id = %evaluator.id))]
    fn learn(&self, evaluator: &Evaluator, records: &[FeedbackRecord]) -> PrismResult<LearningOutcome> {
        let relevant: Vec<&FeedbackRecord> = records
            .iter()
            .filter(|r| r.evaluator_id == evaluator.id)
            .collect();

        if relevant.is_empty() {
            return Ok(LearningOutcome::unchanged(
                evaluator.id.clone(),
                &evaluator.factor_weights,
                evaluator.confidence,
            ));
        }
        if relevant.len() < self.config.min_data_points {
            return Err(PrismError::InsufficientData {
                evaluator_id: evaluator.id.clone(),
                available: relevant.len(),
                required: self.config.min_data_points,
            });
        }
        for record in &relevant {
            record.validate()?;
        }

        let mut weights = evaluator.base_factor_weights.clone();
        let mut adjustments = Vec::new();

        for (change_type, aggregate) in aggregate_impacts(relevant.iter().copied()) {
            let average = aggregate.average();
            if average.abs() <= self.config.significance_threshold {
                continue;
            }
            let factor = self.config.factor_for(&change_type);
            if !weights.contains(factor) {
                debug!(
                    evaluator_id = %evaluator.id,
                    change_type = %change_type,
                    "change type maps to no factor, skipped"
                );
                continue;
            }

            let requested = average * self.config.learning_rate;
            let applied = weights.shift_toward(factor, requested, self.config.min_factor_weight)?;
            if (applied - requested).abs() > WEIGHT_EPSILON {
                debug!(
                    evaluator_id = %evaluator.id,
                    factor,
                    requested,
                    applied,
                    "rebalance could not absorb the full delta"
                );
            }
            adjustments.push(WeightAdjustment {
                change_type: change_type.clone(),
                factor: factor.to_string(),
                average_impact: average,
                sample_count: aggregate.samples,
                requested_delta: requested,
                applied_delta: applied,
            });
        }

        let outcome = LearningOutcome {
            evaluator_id: evaluator.id.clone(),
            original_weights: evaluator.factor_weights.clone(),
            new_weights: weights,
            adjustments,
            data_points: relevant.len(),
            confidence: self.confidence(&relevant),
            learned_at: chrono::Utc::now(),
        };

        info!(
            evaluator_id = %evaluator.id,
            data_points = outcome.data_points,
            adjustments = outcome.adjustments.len(),
            changed = outcome.changed(),
            "learner pass complete"
        );
        Ok(outcome)
    }
}

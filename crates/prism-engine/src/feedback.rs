use std::sync::atomic::Ordering;

use chrono::Utc;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    BatchFailure, FeedbackRecord, LearningOutcome, NormalizationResult, StrategyEffectiveness,
};
use prism_normalizer::sync_factor_copy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::PrismEngine;

/// Acknowledgement of a recorded feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub record_id: String,
    pub evaluator_id: String,
    /// Position in the append-only log.
    pub sequence: usize,
    /// Records now held for this evaluator.
    pub evaluator_records: usize,
    /// Set when the record triggered an automatic learner pass.
    pub learning: Option<LearningOutcome>,
}

/// A recency sensitivity applied during recalibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityUpdate {
    pub evaluator_id: String,
    pub previous: f64,
    pub new: f64,
}

/// Result of one full recalibration pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalibrationReport {
    pub epoch: u64,
    /// Feedback log length the pass worked from. Records appended while it
    /// ran are picked up by the next pass.
    pub watermark: usize,
    pub outcomes: Vec<LearningOutcome>,
    /// Evaluators left unchanged, e.g. for insufficient data.
    pub skipped: Vec<BatchFailure>,
    pub sensitivity_updates: Vec<SensitivityUpdate>,
    pub normalizations: Vec<NormalizationResult>,
    /// Consumers left as they were because normalization failed.
    #[serde(default)]
    pub normalization_failures: Vec<BatchFailure>,
}

impl PrismEngine {
    /// Append a feedback record. Runs a learner pass for its evaluator when
    /// auto-recalibration is on and enough records exist.
    pub fn record_feedback(&self, record: FeedbackRecord) -> PrismResult<FeedbackAck> {
        record.validate()?;
        let evaluator_id = record.evaluator_id.clone();
        let record_id = record.id.clone();
        if !self.evaluators.contains_key(&evaluator_id) {
            return Err(PrismError::EvaluatorNotFound { id: evaluator_id });
        }

        let sequence = {
            let mut log = self.write_log()?;
            log.push(record);
            log.len() - 1
        };
        let evaluator_records = self
            .read_log()?
            .iter()
            .filter(|r| r.evaluator_id == evaluator_id)
            .count();

        // The record is durable once logged; a failed learner pass only
        // leaves the weights for the next recalibration.
        let learning = if self.config.learning.auto_recalibrate
            && evaluator_records >= self.config.learning.min_data_points
        {
            match self.learn_evaluator(&evaluator_id) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!(
                        evaluator_id = %evaluator_id,
                        sequence,
                        error = %e,
                        "automatic learner pass failed"
                    );
                    None
                }
            }
        } else {
            None
        };

        debug!(evaluator_id = %evaluator_id, sequence, evaluator_records, "feedback recorded");
        Ok(FeedbackAck {
            record_id,
            evaluator_id,
            sequence,
            evaluator_records,
            learning,
        })
    }

    /// Learner pass for one evaluator over its full feedback history.
    pub fn learn_evaluator(&self, evaluator_id: &str) -> PrismResult<LearningOutcome> {
        let evaluator = self.evaluator_snapshot(evaluator_id)?;
        let records: Vec<FeedbackRecord> = self
            .read_log()?
            .iter()
            .filter(|r| r.evaluator_id == evaluator_id)
            .cloned()
            .collect();
        let outcome = self.learner.learn(&evaluator, &records)?;
        if self.apply_learning(&outcome)? {
            debug!(evaluator_id, data_points = outcome.data_points, "learner result superseded");
        }
        Ok(outcome)
    }

    /// Learner pass for every evaluator, optional sensitivity adoption, then
    /// normalization of every consumer.
    pub fn recalibrate(&self) -> PrismResult<RecalibrationReport> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let log: Vec<FeedbackRecord> = self.read_log()?.clone();
        let watermark = log.len();
        let span = crate::learning_span!(epoch, watermark);
        let _guard = span.enter();

        let mut evaluators: Vec<_> = self.evaluator_table().into_values().collect();
        evaluators.sort_by(|a, b| a.id.cmp(&b.id));

        let mut outcomes = Vec::new();
        let mut skipped = Vec::new();
        for evaluator in &evaluators {
            match self.learner.learn(evaluator, &log) {
                Ok(outcome) => {
                    if self.apply_learning(&outcome)? {
                        debug!(evaluator_id = %evaluator.id, "learner result superseded");
                        skipped.push(BatchFailure::new(
                            evaluator.id.clone(),
                            "superseded by a pass over more feedback",
                        ));
                    } else {
                        outcomes.push(outcome);
                    }
                }
                Err(e) => {
                    if e.is_non_fatal() {
                        debug!(evaluator_id = %evaluator.id, error = %e, "learner pass skipped");
                    } else {
                        warn!(evaluator_id = %evaluator.id, error = %e, "learner pass failed");
                    }
                    skipped.push(BatchFailure::new(evaluator.id.clone(), e));
                }
            }
        }

        let sensitivity_updates = if self.config.learning.adjust_recency_sensitivity {
            self.adopt_sensitivity_suggestions(&evaluators)?
        } else {
            Vec::new()
        };

        let normalized = self.normalize_all();

        info!(
            epoch,
            watermark,
            learned = outcomes.len(),
            skipped = skipped.len(),
            consumers = normalized.succeeded.len(),
            normalization_failures = normalized.failures.len(),
            "recalibration complete"
        );
        Ok(RecalibrationReport {
            epoch,
            watermark,
            outcomes,
            skipped,
            sensitivity_updates,
            normalizations: normalized.succeeded,
            normalization_failures: normalized.failures,
        })
    }

    /// Advisory sensitivity for an evaluator from the logged performance
    /// samples. Never applied here.
    pub fn suggest_recency_sensitivity(&self, evaluator_id: &str) -> PrismResult<Option<f64>> {
        let evaluator = self.evaluator_snapshot(evaluator_id)?;
        let samples = self.lock_samples()?;
        Ok(self
            .decay
            .suggest_sensitivity(&samples, evaluator_id, evaluator.recency_sensitivity))
    }

    /// Effectiveness of each change type recorded for an evaluator.
    pub fn strategy_effectiveness(&self, evaluator_id: &str) -> PrismResult<Vec<StrategyEffectiveness>> {
        if !self.evaluators.contains_key(evaluator_id) {
            return Err(PrismError::EvaluatorNotFound {
                id: evaluator_id.to_string(),
            });
        }
        let log = self.read_log()?;
        Ok(prism_learning::strategy_effectiveness(
            log.iter().filter(|r| r.evaluator_id == evaluator_id),
        ))
    }

    /// Number of recorded feedback records.
    pub fn feedback_count(&self) -> PrismResult<usize> {
        Ok(self.read_log()?.len())
    }

    /// Write learned weights back and refresh consumer factor copies.
    /// Returns true when the evaluator already holds weights learned from
    /// more records, in which case nothing is written.
    fn apply_learning(&self, outcome: &LearningOutcome) -> PrismResult<bool> {
        if outcome.data_points == 0 {
            return Ok(false);
        }
        let mut entry = self.evaluators.get_mut(&outcome.evaluator_id).ok_or_else(|| {
            PrismError::EvaluatorNotFound {
                id: outcome.evaluator_id.clone(),
            }
        })?;
        if outcome.data_points < entry.learned_records {
            return Ok(true);
        }
        entry.factor_weights = outcome.new_weights.clone();
        entry.learned_records = outcome.data_points;
        entry.confidence = outcome.confidence;
        entry.last_updated = Utc::now();
        // Copies are synced under the evaluator lock so a concurrent pass
        // cannot interleave an older copy.
        for mut profile in self.consumers.iter_mut() {
            sync_factor_copy(&mut profile, &entry);
        }
        Ok(false)
    }

    fn adopt_sensitivity_suggestions(
        &self,
        evaluators: &[prism_core::models::Evaluator],
    ) -> PrismResult<Vec<SensitivityUpdate>> {
        let suggestions: Vec<(String, f64, f64)> = {
            let samples = self.lock_samples()?;
            evaluators
                .iter()
                .filter_map(|e| {
                    self.decay
                        .suggest_sensitivity(&samples, &e.id, e.recency_sensitivity)
                        .map(|s| (e.id.clone(), e.recency_sensitivity, s))
                })
                .collect()
        };

        let mut updates = Vec::new();
        for (evaluator_id, previous, new) in suggestions {
            if (new - previous).abs() < f64::EPSILON {
                continue;
            }
            match self.set_recency_sensitivity(&evaluator_id, new) {
                Ok(()) => updates.push(SensitivityUpdate {
                    evaluator_id,
                    previous,
                    new,
                }),
                Err(e) => warn!(evaluator_id = %evaluator_id, error = %e, "sensitivity not applied"),
            }
        }
        Ok(updates)
    }
}

use std::collections::BTreeMap;

use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    BatchFailure, BatchOutcome, ConsistencyReport, ConsumerWeightProfile, GlobalWeightUpdate,
    NormalizationResult,
};
use prism_normalizer::{normalized_performance, WeightNormalizer};
use tracing::{info, warn};

use crate::engine::PrismEngine;

impl PrismEngine {
    /// Register a consumer with a copy of the current canonical weights.
    pub fn register_consumer(&self, consumer_id: &str) -> PrismResult<ConsumerWeightProfile> {
        let evaluators = self.evaluator_table();
        let profile = self
            .normalizer
            .register_consumer(consumer_id, evaluators.values())?;
        match self.consumers.entry(consumer_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(PrismError::validation(format!(
                "consumer {consumer_id} already registered"
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(profile.clone());
                info!(consumer_id, "consumer registered");
                Ok(profile)
            }
        }
    }

    /// Override one evaluator weight for one consumer.
    pub fn set_consumer_weight(
        &self,
        consumer_id: &str,
        evaluator_id: &str,
        weight: f64,
    ) -> PrismResult<f64> {
        let evaluator = self.evaluator_snapshot(evaluator_id)?;
        let mut profile = self
            .consumers
            .get_mut(consumer_id)
            .ok_or_else(|| PrismError::ConsumerNotFound {
                id: consumer_id.to_string(),
            })?;
        self.normalizer
            .set_consumer_weight(&mut profile, &evaluator, weight)
    }

    /// Operator change of an evaluator's recency sensitivity.
    pub fn set_recency_sensitivity(&self, evaluator_id: &str, sensitivity: f64) -> PrismResult<()> {
        let mut evaluator = self
            .evaluators
            .get_mut(evaluator_id)
            .ok_or_else(|| PrismError::EvaluatorNotFound {
                id: evaluator_id.to_string(),
            })?;
        let previous = evaluator.recency_sensitivity;
        evaluator.set_recency_sensitivity(sensitivity)?;
        info!(evaluator_id, previous, sensitivity, "recency sensitivity changed");
        Ok(())
    }

    /// Half-correct one consumer, or every consumer when `None`.
    ///
    /// Also records each evaluator's mean drift across the normalized
    /// consumers in `Evaluator::drift_factor`. With `None`, a consumer that
    /// fails is logged and left unchanged while the rest are normalized.
    pub fn normalize(&self, consumer_id: Option<&str>) -> PrismResult<Vec<NormalizationResult>> {
        match consumer_id {
            Some(id) => {
                let globals = self.global_weights();
                let span = crate::normalize_span!(1);
                let _guard = span.enter();
                let result = {
                    let mut profile = self
                        .consumers
                        .get_mut(id)
                        .ok_or_else(|| PrismError::ConsumerNotFound { id: id.to_string() })?;
                    self.normalizer.normalize_profile(&mut profile, &globals)?
                };
                let results = vec![result];
                self.record_drift(&results);
                Ok(results)
            }
            None => Ok(self.normalize_all().succeeded),
        }
    }

    /// Normalize every consumer, reporting per-consumer failures.
    pub fn normalize_all(&self) -> BatchOutcome<NormalizationResult> {
        let mut ids: Vec<String> = self.consumers.iter().map(|c| c.key().clone()).collect();
        ids.sort();
        self.normalize_consumers(&ids)
    }

    fn normalize_consumers(&self, ids: &[String]) -> BatchOutcome<NormalizationResult> {
        let globals = self.global_weights();
        let span = crate::normalize_span!(ids.len());
        let _guard = span.enter();

        let mut outcome = BatchOutcome::new();
        for id in ids {
            let Some(mut profile) = self.consumers.get_mut(id) else {
                continue;
            };
            match self.normalizer.normalize_profile(&mut profile, &globals) {
                Ok(result) => outcome.succeeded.push(result),
                Err(e) => {
                    warn!(consumer_id = %id, error = %e, "consumer not normalized");
                    outcome.failures.push(BatchFailure::new(id.clone(), e));
                }
            }
        }

        self.record_drift(&outcome.succeeded);

        let violations: usize = outcome.succeeded.iter().map(|r| r.violations.len()).sum();
        info!(
            consumers = outcome.succeeded.len(),
            failed = outcome.failures.len(),
            violations,
            "normalization complete"
        );
        outcome
    }

    /// Mean drift per evaluator across `results`, stored on the evaluator.
    fn record_drift(&self, results: &[NormalizationResult]) {
        for (evaluator_id, drift) in WeightNormalizer::mean_drift_by_evaluator(results) {
            if let Some(mut evaluator) = self.evaluators.get_mut(&evaluator_id) {
                evaluator.drift_factor = drift;
            }
        }
    }

    /// Report consumer weights deviating from canonical, without correcting.
    pub fn validate_consistency(&self) -> ConsistencyReport {
        let globals = self.global_weights();
        let profiles: Vec<ConsumerWeightProfile> =
            self.consumers.iter().map(|c| c.value().clone()).collect();
        self.normalizer.validate_consistency(&profiles, &globals)
    }

    /// Recompute canonical weights from per-evaluator performance samples
    /// (0–100) and push them to every consumer immediately.
    ///
    /// Everything is validated before the first weight changes.
    pub fn update_global_weights(
        &self,
        samples: &BTreeMap<String, Vec<f64>>,
    ) -> PrismResult<Vec<GlobalWeightUpdate>> {
        for (evaluator_id, values) in samples {
            if !self.evaluators.contains_key(evaluator_id) {
                return Err(PrismError::EvaluatorNotFound {
                    id: evaluator_id.clone(),
                });
            }
            normalized_performance(values)?;
        }

        let mut updates = Vec::new();
        for (evaluator_id, values) in samples {
            let Some(mut evaluator) = self.evaluators.get_mut(evaluator_id) else {
                continue;
            };
            if let Some(update) =
                self.normalizer
                    .update_global_weight(&mut evaluator, values, self.consumers.iter_mut())?
            {
                updates.push(update);
            }
        }
        Ok(updates)
    }

    pub fn consumer(&self, consumer_id: &str) -> Option<ConsumerWeightProfile> {
        self.consumers.get(consumer_id).map(|c| c.clone())
    }
}

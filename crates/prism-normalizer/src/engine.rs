use std::collections::BTreeMap;
use std::ops::DerefMut;

use chrono::Utc;
use prism_core::config::NormalizerConfig;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    ConsistencyReport, ConsumerEvaluatorWeights, ConsumerWeightProfile, DriftCorrection,
    DriftViolation, Evaluator, GlobalWeightUpdate, Inconsistency, NormalizationResult,
};
use tracing::{debug, info, instrument, warn};

use crate::correction::{drift_factor, half_correction};
use crate::global::{canonical_weight, normalized_performance};

/// Normalizes consumer weight copies against the canonical evaluator weights.
#[derive(Debug, Clone, Default)]
pub struct WeightNormalizer {
    config: NormalizerConfig,
}

impl WeightNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// A fresh consumer profile copying every canonical weight.
    pub fn register_consumer<'a>(
        &self,
        consumer_id: &str,
        evaluators: impl IntoIterator<Item = &'a Evaluator>,
    ) -> PrismResult<ConsumerWeightProfile> {
        if consumer_id.is_empty() {
            return Err(PrismError::validation("consumer id must not be empty"));
        }
        Ok(ConsumerWeightProfile::from_evaluators(consumer_id, evaluators))
    }

    /// Explicit per-consumer override, clamped to the consumer bounds.
    pub fn set_consumer_weight(
        &self,
        profile: &mut ConsumerWeightProfile,
        evaluator: &Evaluator,
        weight: f64,
    ) -> PrismResult<f64> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(PrismError::validation(format!(
                "consumer weight must be finite and non-negative, got {weight}"
            )));
        }
        let clamped = weight.clamp(self.config.min_consumer_weight, self.config.max_consumer_weight);
        profile
            .weights
            .entry(evaluator.id.clone())
            .and_modify(|w| w.weight = clamped)
            .or_insert_with(|| ConsumerEvaluatorWeights {
                weight: clamped,
                factors: evaluator.factor_weights.clone(),
            });
        Ok(clamped)
    }

    /// One half-correction pass over a profile.
    ///
    /// `globals` maps evaluator id → canonical weight. An evaluator whose
    /// canonical weight is not positive is skipped and listed in the result.
    /// The profile is only modified once every other weight has been
    /// corrected successfully.
    #[instrument(skip(self, profile, globals), fields(consumer_id = %profile.consumer_id))]
    pub fn normalize_profile(
        &self,
        profile: &mut ConsumerWeightProfile,
        globals: &BTreeMap<String, f64>,
    ) -> PrismResult<NormalizationResult> {
        let original_weights = profile.scalar_weights();
        let mut new_weights = BTreeMap::new();
        let mut drift_corrections = Vec::with_capacity(original_weights.len());
        let mut violations = Vec::new();
        let mut skipped_evaluators = Vec::new();
        let mut residual = 0.0;
        let mut ratio = 0.0;

        for (evaluator_id, consumer) in &original_weights {
            let global = *globals
                .get(evaluator_id)
                .ok_or_else(|| PrismError::EvaluatorNotFound {
                    id: evaluator_id.clone(),
                })?;
            if !(global > 0.0) {
                warn!(
                    consumer_id = %profile.consumer_id,
                    evaluator_id = %evaluator_id,
                    global,
                    "canonical weight not positive, evaluator skipped"
                );
                new_weights.insert(evaluator_id.clone(), *consumer);
                skipped_evaluators.push(evaluator_id.clone());
                continue;
            }
            let step = half_correction(*consumer, global, &self.config)?;

            if step.exceeds_limit {
                warn!(
                    consumer_id = %profile.consumer_id,
                    evaluator_id = %evaluator_id,
                    drift = step.drift,
                    limit = self.config.hard_correction_limit,
                    "drift beyond hard correction limit"
                );
                violations.push(DriftViolation {
                    consumer_id: profile.consumer_id.clone(),
                    evaluator_id: evaluator_id.clone(),
                    drift: step.drift,
                    limit: self.config.hard_correction_limit,
                });
            }

            residual += drift_factor(step.new_weight, global)?;
            ratio += step.new_weight / global;
            new_weights.insert(evaluator_id.clone(), step.new_weight);
            drift_corrections.push(DriftCorrection {
                evaluator_id: evaluator_id.clone(),
                global_weight: global,
                original_weight: *consumer,
                new_weight: step.new_weight,
                drift_factor: step.drift,
                correction_factor: step.factor,
            });
        }

        let count = drift_corrections.len();
        let confidence = if count == 0 {
            1.0
        } else {
            (1.0 - residual / count as f64).clamp(0.0, 1.0)
        };
        let now = Utc::now();

        for (evaluator_id, weight) in &new_weights {
            if let Some(entry) = profile.weights.get_mut(evaluator_id) {
                entry.weight = *weight;
            }
        }
        profile.normalization_factor = if count == 0 { 1.0 } else { ratio / count as f64 };
        profile.last_normalized = Some(now);

        let result = NormalizationResult {
            consumer_id: profile.consumer_id.clone(),
            original_weights,
            new_weights,
            drift_corrections,
            confidence,
            violations,
            skipped_evaluators,
            normalized_at: now,
        };
        debug!(
            consumer_id = %result.consumer_id,
            corrected = result.corrected_count(),
            confidence = result.confidence,
            "consumer normalized"
        );
        Ok(result)
    }

    /// Pairs whose deviation exceeds `consistency_tolerance × global`. Reads only.
    pub fn validate_consistency<'a>(
        &self,
        profiles: impl IntoIterator<Item = &'a ConsumerWeightProfile>,
        globals: &BTreeMap<String, f64>,
    ) -> ConsistencyReport {
        let mut checked_pairs = 0;
        let mut inconsistencies = Vec::new();

        for profile in profiles {
            for (evaluator_id, copy) in &profile.weights {
                let Some(&global) = globals.get(evaluator_id) else {
                    continue;
                };
                checked_pairs += 1;
                let deviation = (copy.weight - global).abs();
                if deviation > self.config.consistency_tolerance * global {
                    inconsistencies.push(Inconsistency {
                        consumer_id: profile.consumer_id.clone(),
                        evaluator_id: evaluator_id.clone(),
                        consumer_weight: copy.weight,
                        global_weight: global,
                        deviation,
                    });
                }
            }
        }

        inconsistencies.sort_by(|a, b| {
            a.consumer_id
                .cmp(&b.consumer_id)
                .then_with(|| a.evaluator_id.cmp(&b.evaluator_id))
        });
        ConsistencyReport {
            checked_pairs,
            inconsistencies,
            checked_at: Utc::now(),
        }
    }

    /// Recompute one evaluator's canonical weight from performance samples
    /// and push it into every consumer copy, factors included.
    ///
    /// `None` when there are no samples; nothing changes then.
    pub fn update_global_weight<I>(
        &self,
        evaluator: &mut Evaluator,
        samples: &[f64],
        profiles: I,
    ) -> PrismResult<Option<GlobalWeightUpdate>>
    where
        I: IntoIterator,
        I::Item: DerefMut<Target = ConsumerWeightProfile>,
    {
        let Some(normalized) = normalized_performance(samples)? else {
            return Ok(None);
        };
        let previous_weight = evaluator.current_weight;
        let new_weight = canonical_weight(evaluator.base_weight, normalized, &self.config);
        evaluator.current_weight = new_weight;
        evaluator.last_updated = Utc::now();

        let mut consumers_updated = 0;
        for mut profile in profiles {
            propagate(&mut *profile, evaluator);
            consumers_updated += 1;
        }

        info!(
            evaluator_id = %evaluator.id,
            previous_weight,
            new_weight,
            normalized_performance = normalized,
            consumers_updated,
            "canonical weight updated"
        );
        Ok(Some(GlobalWeightUpdate {
            evaluator_id: evaluator.id.clone(),
            previous_weight,
            new_weight,
            normalized_performance: normalized,
            sample_count: samples.len(),
            consumers_updated,
        }))
    }

    /// Batch form of [`WeightNormalizer::update_global_weight`] over plain slices.
    /// Samples for an unknown evaluator fail the whole batch before anything changes.
    pub fn update_global_weights(
        &self,
        evaluators: &mut [Evaluator],
        samples: &BTreeMap<String, Vec<f64>>,
        profiles: &mut [ConsumerWeightProfile],
    ) -> PrismResult<Vec<GlobalWeightUpdate>> {
        for (evaluator_id, values) in samples {
            if !evaluators.iter().any(|e| &e.id == evaluator_id) {
                return Err(PrismError::EvaluatorNotFound {
                    id: evaluator_id.clone(),
                });
            }
            normalized_performance(values)?;
        }

        let mut updates = Vec::new();
        for evaluator in evaluators.iter_mut() {
            let Some(values) = samples.get(&evaluator.id) else {
                continue;
            };
            if let Some(update) = self.update_global_weight(evaluator, values, profiles.iter_mut())? {
                updates.push(update);
            }
        }
        Ok(updates)
    }

    /// Mean drift per evaluator across normalization results, for
    /// `Evaluator::drift_factor`.
    pub fn mean_drift_by_evaluator(results: &[NormalizationResult]) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for correction in results.iter().flat_map(|r| &r.drift_corrections) {
            let entry = sums.entry(correction.evaluator_id.clone()).or_insert((0.0, 0));
            entry.0 += correction.drift_factor;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(id, (sum, n))| (id, sum / n as f64))
            .collect()
    }
}

/// Overwrite a consumer's copy of one evaluator with the canonical values.
pub fn propagate(profile: &mut ConsumerWeightProfile, evaluator: &Evaluator) {
    profile.weights.insert(
        evaluator.id.clone(),
        ConsumerEvaluatorWeights {
            weight: evaluator.current_weight,
            factors: evaluator.factor_weights.clone(),
        },
    );
}

/// Refresh only the factor copy, leaving the consumer's scalar weight alone.
pub fn sync_factor_copy(profile: &mut ConsumerWeightProfile, evaluator: &Evaluator) {
    if let Some(copy) = profile.weights.get_mut(&evaluator.id) {
        copy.factors = evaluator.factor_weights.clone();
    }
}

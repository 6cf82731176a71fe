use chrono::Utc;
use prism_core::constants::MAX_BULK_BATCH_SIZE;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    BatchFailure, BatchOutcome, DecayBreakdown, EvaluatorScore, PerformanceDeltaSample,
    RawMeasurement, ScoreDeltas, ScoreHistoryPoint, ScoredEntity,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::PrismEngine;

/// One item of a batch ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub entity_id: String,
    pub evaluator_id: String,
    pub measurement: RawMeasurement,
}

/// What one ingestion changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    pub entity_id: String,
    pub evaluator_id: String,
    pub raw_score: f64,
    pub adjusted_score: f64,
    pub decay: DecayBreakdown,
    /// Entity composite after this measurement.
    pub composite_score: f64,
    pub deltas: ScoreDeltas,
}

const DAY: i64 = 1;
const WEEK: i64 = 7;
const MONTH: i64 = 30;

impl PrismEngine {
    /// Score one measurement, apply recency decay, and fold it into the
    /// entity and its history.
    pub fn ingest(
        &self,
        entity_id: &str,
        evaluator_id: &str,
        measurement: RawMeasurement,
    ) -> PrismResult<IngestResult> {
        let span = crate::ingest_span!(entity_id, evaluator_id);
        let _guard = span.enter();

        if entity_id.is_empty() {
            return Err(PrismError::validation("entity id must not be empty"));
        }
        let evaluator = self.evaluator_snapshot(evaluator_id)?;
        if let Some(visibility) = &measurement.visibility {
            visibility.validate()?;
        }

        let scored = self.scorer.score_measurement(&measurement, &evaluator)?;
        let content_age = measurement.content_age_days.unwrap_or(0.0);
        let decay = {
            let span = crate::decay_span!(evaluator_id);
            let _guard = span.enter();
            self.recency
                .adjust_for_recency(scored.raw_score, content_age, evaluator.recency_sensitivity)?
        };
        let measured_at = measurement.measured_at.unwrap_or_else(Utc::now);

        let score = EvaluatorScore {
            evaluator_id: evaluator_id.to_string(),
            raw_score: scored.raw_score,
            adjusted_score: decay.adjusted_score,
            category_breakdown: scored.categories,
            factor_breakdown: measurement.factor_scores.clone(),
            visibility: measurement.visibility.clone(),
            content_age_days: content_age.max(0.0),
            measured_at,
        };

        let (previous, composite, deltas) = {
            let mut entity = self
                .entities
                .entry(entity_id.to_string())
                .or_insert_with(|| ScoredEntity::new(entity_id, measured_at));
            let previous = entity
                .evaluator_scores
                .get(evaluator_id)
                .map(|s| s.adjusted_score);

            // A backfilled measurement only extends history; the entity keeps
            // each evaluator's latest score.
            let point = ScoreHistoryPoint {
                entity_id: entity_id.to_string(),
                timestamp: measured_at,
                composite_score: entity.composite_with(&score),
                sub_scores: entity.sub_scores_with(&score),
                validation: measurement.validation,
                issues: measurement.issues.clone(),
            };
            self.history.append(point)?;
            let stored = entity.upsert_score(score);

            if stored {
                let latest = entity.last_updated;
                entity.deltas = ScoreDeltas {
                    daily: self.history.delta_since(entity_id, DAY, latest),
                    weekly: self.history.delta_since(entity_id, WEEK, latest),
                    monthly: self.history.delta_since(entity_id, MONTH, latest),
                };
            } else {
                debug!(evaluator_id, %measured_at, "older than stored measurement, history only");
            }
            (previous.filter(|_| stored), entity.composite_score, entity.deltas)
        };

        debug!(
            raw_score = scored.raw_score,
            adjusted_score = decay.adjusted_score,
            composite,
            "measurement ingested"
        );
        Ok(IngestResult {
            entity_id: entity_id.to_string(),
            evaluator_id: evaluator_id.to_string(),
            raw_score: scored.raw_score,
            adjusted_score: decay.adjusted_score,
            decay,
            composite_score: composite,
            deltas,
        })
    }

    /// Ingest many measurements. A failing item is reported and the rest
    /// continue.
    pub fn ingest_batch(&self, requests: Vec<IngestRequest>) -> PrismResult<BatchOutcome<IngestResult>> {
        if requests.len() > MAX_BULK_BATCH_SIZE {
            return Err(PrismError::validation(format!(
                "batch of {} exceeds the limit of {MAX_BULK_BATCH_SIZE}",
                requests.len()
            )));
        }
        let mut outcome = BatchOutcome::new();
        for request in requests {
            match self.ingest(&request.entity_id, &request.evaluator_id, request.measurement) {
                Ok(result) => outcome.succeeded.push(result),
                Err(e) => {
                    warn!(entity_id = %request.entity_id, error = %e, "batch item failed");
                    outcome.failures.push(BatchFailure::new(request.entity_id, e));
                }
            }
        }
        Ok(outcome)
    }
}

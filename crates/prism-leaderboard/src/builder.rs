//! Leaderboard rebuild: score → filter → rank → highlight → fingerprint.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use prism_core::config::LeaderboardConfig;
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{
    BatchFailure, Evaluator, LeaderboardEntry, LeaderboardSnapshot, PerformanceMetrics,
    ScoredEntity,
};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::components::evaluator_leaderboard_score;
use crate::fingerprint::ranking_fingerprint;
use crate::highlights;
use crate::metrics;

/// Output of one rebuild. The snapshot is not stored by the builder.
#[derive(Debug, Clone)]
pub struct LeaderboardBuild {
    pub snapshot: LeaderboardSnapshot,
    pub metrics: PerformanceMetrics,
    /// Entities that could not be scored; everything else was ranked.
    pub failures: Vec<BatchFailure>,
}

/// One entity's aggregate before ranking.
#[derive(Debug, Clone)]
struct ScoredRow {
    entity_id: String,
    composite: f64,
    evaluator_scores: BTreeMap<String, f64>,
    total_citations: u32,
    inclusion_rate: f64,
}

/// Stateless leaderboard builder.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    config: LeaderboardConfig,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LeaderboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Rank every entity. `previous` supplies rank changes.
    #[instrument(skip_all, fields(entities = entities.len()))]
    pub fn rebuild(
        &self,
        entities: &[ScoredEntity],
        evaluators: &BTreeMap<String, Evaluator>,
        previous: Option<&LeaderboardSnapshot>,
    ) -> PrismResult<LeaderboardBuild> {
        self.build(entities, evaluators, previous, None)
    }

    /// Like [`Leaderboard::rebuild`], checking `cancel` before each chunk.
    /// A cancelled rebuild returns `Cancelled` and produces no snapshot.
    pub fn rebuild_chunked(
        &self,
        entities: &[ScoredEntity],
        evaluators: &BTreeMap<String, Evaluator>,
        previous: Option<&LeaderboardSnapshot>,
        cancel: &AtomicBool,
    ) -> PrismResult<LeaderboardBuild> {
        self.build(entities, evaluators, previous, Some(cancel))
    }

    fn build(
        &self,
        entities: &[ScoredEntity],
        evaluators: &BTreeMap<String, Evaluator>,
        previous: Option<&LeaderboardSnapshot>,
        cancel: Option<&AtomicBool>,
    ) -> PrismResult<LeaderboardBuild> {
        let total = entities.len();
        let mut rows = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut excluded = 0;
        let mut processed = 0;

        for chunk in entities.chunks(self.config.chunk_size.max(1)) {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                info!(processed, total, "leaderboard rebuild cancelled");
                return Err(PrismError::Cancelled { processed, total });
            }

            let results: Vec<(String, PrismResult<Option<ScoredRow>>)> = chunk
                .par_iter()
                .map(|entity| (entity.id.clone(), self.score_entity(entity, evaluators)))
                .collect();

            for (entity_id, result) in results {
                match result {
                    Ok(Some(row)) if row.composite >= self.config.min_score => rows.push(row),
                    Ok(_) => excluded += 1,
                    Err(e) => {
                        warn!(entity_id = %entity_id, error = %e, "entity skipped in rebuild");
                        failures.push(BatchFailure::new(entity_id, e));
                    }
                }
            }
            processed += chunk.len();
            debug!(processed, total, "leaderboard chunk scored");
        }

        rows.sort_by(|a, b| {
            b.composite
                .total_cmp(&a.composite)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });

        let groups: BTreeMap<String, String> = evaluators
            .values()
            .map(|e| (e.id.clone(), e.group.clone()))
            .collect();

        let previous_ranks: HashMap<&str, usize> =
            previous.map(LeaderboardSnapshot::rank_index).unwrap_or_default();

        let mut entries: Vec<LeaderboardEntry> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let rank = i + 1;
                let highlights = highlights::entity_highlights(
                    &row.evaluator_scores,
                    &groups,
                    row.composite,
                    self.config.high_performer_threshold,
                );
                let rank_change = previous_ranks
                    .get(row.entity_id.as_str())
                    .map(|prev| *prev as i64 - rank as i64);
                LeaderboardEntry {
                    rank,
                    entity_id: row.entity_id,
                    composite_score: row.composite,
                    evaluator_scores: row.evaluator_scores,
                    total_citations: row.total_citations,
                    inclusion_rate: row.inclusion_rate,
                    highlights,
                    rank_change,
                }
            })
            .collect();

        let snapshot_highlights = highlights::apply(&mut entries);
        let fingerprint = ranking_fingerprint(&entries);
        let metrics = metrics::compute(&entries, total, excluded, failures.len());

        info!(
            total,
            ranked = metrics.ranked_entities,
            excluded,
            failed = failures.len(),
            fingerprint = %fingerprint,
            "leaderboard rebuilt"
        );

        Ok(LeaderboardBuild {
            snapshot: LeaderboardSnapshot {
                id: uuid::Uuid::new_v4().to_string(),
                created_at: Utc::now(),
                entries,
                highlights: snapshot_highlights,
                fingerprint,
                metrics: metrics.clone(),
            },
            metrics,
            failures,
        })
    }

    /// `None` when the entity has no scorable evaluator.
    fn score_entity(
        &self,
        entity: &ScoredEntity,
        evaluators: &BTreeMap<String, Evaluator>,
    ) -> PrismResult<Option<ScoredRow>> {
        let mut evaluator_scores = BTreeMap::new();
        let mut total_citations: u32 = 0;
        let mut reported = 0usize;
        let mut included = 0usize;

        for (evaluator_id, score) in &entity.evaluator_scores {
            let evaluator = evaluators
                .get(evaluator_id)
                .ok_or_else(|| PrismError::EvaluatorNotFound {
                    id: evaluator_id.clone(),
                })?;
            let Some(value) =
                evaluator_leaderboard_score(score, evaluator.current_weight, &self.config)?
            else {
                continue;
            };
            evaluator_scores.insert(evaluator_id.clone(), value);

            if let Some(v) = &score.visibility {
                total_citations = total_citations.saturating_add(v.citation_count);
                reported += 1;
                if v.included {
                    included += 1;
                }
            }
        }

        if evaluator_scores.is_empty() {
            return Ok(None);
        }
        let composite =
            evaluator_scores.values().sum::<f64>() / evaluator_scores.len() as f64;
        let inclusion_rate = if reported == 0 {
            0.0
        } else {
            included as f64 / reported as f64
        };

        Ok(Some(ScoredRow {
            entity_id: entity.id.clone(),
            composite,
            evaluator_scores,
            total_citations,
            inclusion_rate,
        }))
    }
}

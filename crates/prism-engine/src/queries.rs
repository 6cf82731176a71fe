use chrono::{DateTime, Duration, Utc};
use prism_core::errors::PrismResult;
use prism_core::models::{Evaluator, HistorySummary, ScoredEntity, TrendAnalysis};
use prism_leaderboard::stale_entity_ids;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::PrismEngine;

/// What a retention pass removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PruneReport {
    pub entities_removed: Vec<String>,
    /// Points of removed entities plus points older than the window.
    pub history_points_removed: usize,
}

impl PrismEngine {
    /// Trend of one entity over the last `window_days`.
    pub fn get_trend(&self, entity_id: &str, window_days: i64) -> PrismResult<TrendAnalysis> {
        let span = crate::history_span!("trend");
        let _guard = span.enter();
        self.history.calculate_trend(entity_id, window_days)
    }

    /// History statistics over the last `window_days`.
    pub fn history_summary(&self, window_days: i64) -> HistorySummary {
        let span = crate::history_span!("summary");
        let _guard = span.enter();
        self.history.summary(window_days)
    }

    /// Drop entities without a measurement inside the retention window, and
    /// history older than it.
    pub fn prune(&self, now: DateTime<Utc>) -> PrismResult<PruneReport> {
        let span = crate::history_span!("prune");
        let _guard = span.enter();

        let retention_days = self.config.leaderboard.entity_retention_days;
        let stale = {
            let entities: Vec<ScoredEntity> =
                self.entities.iter().map(|e| e.value().clone()).collect();
            stale_entity_ids(&entities, now, retention_days)
        };
        let mut history_points_removed = 0;
        for id in &stale {
            self.entities.remove(id);
            history_points_removed += self.history.remove_entity(id).map_or(0, |p| p.len());
        }
        history_points_removed += self.history.prune(now - Duration::days(retention_days));

        info!(
            entities_removed = stale.len(),
            history_points_removed,
            "retention applied"
        );
        Ok(PruneReport {
            entities_removed: stale,
            history_points_removed,
        })
    }

    pub fn entity(&self, entity_id: &str) -> Option<ScoredEntity> {
        self.entities.get(entity_id).map(|e| e.clone())
    }

    pub fn evaluator(&self, evaluator_id: &str) -> Option<Evaluator> {
        self.evaluators.get(evaluator_id).map(|e| e.clone())
    }

    /// Every evaluator, sorted by id.
    pub fn evaluators(&self) -> Vec<Evaluator> {
        self.evaluator_table().into_values().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

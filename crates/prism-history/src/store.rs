//! ScoreHistory — per-entity point logs in a DashMap.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use prism_core::config::HistoryConfig;
use prism_core::constants::{MAX_SCORE, MIN_SCORE};
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{HistorySummary, ScoreHistoryPoint, TrendAnalysis, TrendDirection};
use tracing::debug;

use crate::summary;
use crate::trend::{classify, percent_change};

/// Thread-safe score history. Each entity's points are kept sorted by
/// timestamp and capped at `max_points_per_entity`.
pub struct ScoreHistory {
    config: HistoryConfig,
    entries: DashMap<String, Vec<ScoreHistoryPoint>>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Insert a point in timestamp order. Points with an equal timestamp keep
    /// their arrival order. Evicts the oldest points beyond the cap.
    pub fn append(&self, point: ScoreHistoryPoint) -> PrismResult<()> {
        validate_point(&point)?;
        let mut points = self.entries.entry(point.entity_id.clone()).or_default();
        let at = points.partition_point(|p| p.timestamp <= point.timestamp);
        points.insert(at, point);

        let cap = self.config.max_points_per_entity;
        if points.len() > cap {
            let excess = points.len() - cap;
            points.drain(..excess);
        }
        Ok(())
    }

    /// All points for an entity, oldest first.
    pub fn points(&self, entity_id: &str) -> Option<Vec<ScoreHistoryPoint>> {
        self.entries.get(entity_id).map(|p| p.clone())
    }

    pub fn latest(&self, entity_id: &str) -> Option<ScoreHistoryPoint> {
        self.entries.get(entity_id).and_then(|p| p.last().cloned())
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entries.contains_key(entity_id)
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    /// Trend over the last `window_days`, relative to now.
    pub fn calculate_trend(&self, entity_id: &str, window_days: i64) -> PrismResult<TrendAnalysis> {
        self.calculate_trend_at(entity_id, window_days, Utc::now())
    }

    /// Trend comparing the oldest and newest point in `[now − window, now]`.
    pub fn calculate_trend_at(
        &self,
        entity_id: &str,
        window_days: i64,
        now: DateTime<Utc>,
    ) -> PrismResult<TrendAnalysis> {
        let points = self
            .entries
            .get(entity_id)
            .ok_or_else(|| PrismError::EntityNotFound {
                id: entity_id.to_string(),
            })?;
        Ok(trend_over(
            entity_id,
            &points,
            window_days,
            now,
            self.config.trend_threshold_percent,
        ))
    }

    /// Latest composite minus the latest composite at or before `now − days`.
    /// `None` when the history does not reach back that far.
    pub fn delta_since(&self, entity_id: &str, days: i64, now: DateTime<Utc>) -> Option<f64> {
        let points = self.entries.get(entity_id)?;
        let latest = points.last()?;
        let cutoff = now - Duration::days(days);
        let idx = points.partition_point(|p| p.timestamp <= cutoff);
        if idx == 0 {
            return None;
        }
        Some(latest.composite_score - points[idx - 1].composite_score)
    }

    /// Cross-entity statistics; movers and issues come from the window.
    pub fn summary(&self, window_days: i64) -> HistorySummary {
        self.summary_at(window_days, Utc::now())
    }

    pub fn summary_at(&self, window_days: i64, now: DateTime<Utc>) -> HistorySummary {
        let snapshot: Vec<(String, Vec<ScoreHistoryPoint>)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        summary::build(&snapshot, window_days, now, &self.config)
    }

    /// Drop points older than `cutoff` and entities left without points.
    /// Returns the number of points removed.
    pub fn prune(&self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, points| {
            let before = points.len();
            points.retain(|p| p.timestamp >= cutoff);
            removed += before - points.len();
            !points.is_empty()
        });
        debug!(removed, %cutoff, "history pruned");
        removed
    }

    pub fn remove_entity(&self, entity_id: &str) -> Option<Vec<ScoreHistoryPoint>> {
        self.entries.remove(entity_id).map(|(_, v)| v)
    }

    /// Every point, grouped by entity id, for export.
    pub fn export(&self) -> Vec<ScoreHistoryPoint> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids.iter()
            .filter_map(|id| self.entries.get(id).map(|p| p.clone()))
            .flatten()
            .collect()
    }

    /// Replace the whole history. Every point is validated before anything
    /// is replaced.
    pub fn replace_all(&self, points: Vec<ScoreHistoryPoint>) -> PrismResult<()> {
        for point in &points {
            validate_point(point)?;
        }
        self.entries.clear();
        for point in points {
            self.append(point)?;
        }
        Ok(())
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn trend_over(
    entity_id: &str,
    points: &[ScoreHistoryPoint],
    window_days: i64,
    now: DateTime<Utc>,
    threshold_percent: f64,
) -> TrendAnalysis {
    let start = now - Duration::days(window_days);
    let window: Vec<ScoreHistoryPoint> = points
        .iter()
        .filter(|p| p.timestamp >= start && p.timestamp <= now)
        .cloned()
        .collect();

    let start_score = window.first().map(|p| p.composite_score);
    let end_score = window.last().map(|p| p.composite_score);
    let sufficient_data = window.len() >= 2;

    let (direction, percent) = match (start_score, end_score) {
        (Some(s), Some(e)) if sufficient_data => {
            let pct = percent_change(s, e);
            (classify(pct, threshold_percent), pct)
        }
        _ => (TrendDirection::Stable, 0.0),
    };

    TrendAnalysis {
        entity_id: entity_id.to_string(),
        window_days,
        direction,
        percent_change: percent,
        start_score,
        end_score,
        sufficient_data,
        points: window,
    }
}

fn validate_point(point: &ScoreHistoryPoint) -> PrismResult<()> {
    if point.entity_id.is_empty() {
        return Err(PrismError::validation("history point needs an entity id"));
    }
    let score = point.composite_score;
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(PrismError::validation(format!(
            "history composite {score} for {} outside [{MIN_SCORE}, {MAX_SCORE}]",
            point.entity_id
        )));
    }
    if point.sub_scores.values().any(|s| !s.is_finite()) {
        return Err(PrismError::validation(format!(
            "history point for {} has a non-finite sub-score",
            point.entity_id
        )));
    }
    Ok(())
}

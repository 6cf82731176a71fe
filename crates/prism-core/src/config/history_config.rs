use serde::{Deserialize, Serialize};

use super::defaults;

/// Score history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Percent change separating improving/declining from stable.
    pub trend_threshold_percent: f64,
    /// Points retained per entity; the oldest are evicted first.
    pub max_points_per_entity: usize,
    /// Movers listed per direction in summaries.
    pub top_movers: usize,
    /// Window used when a caller does not pass one.
    pub default_window_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            trend_threshold_percent: defaults::DEFAULT_TREND_THRESHOLD_PERCENT,
            max_points_per_entity: defaults::DEFAULT_MAX_POINTS_PER_ENTITY,
            top_movers: defaults::DEFAULT_TOP_MOVERS,
            default_window_days: defaults::DEFAULT_TREND_WINDOW_DAYS,
        }
    }
}

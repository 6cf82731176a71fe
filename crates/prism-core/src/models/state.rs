use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ConsumerWeightProfile, Evaluator, FeedbackRecord, LeaderboardSnapshot, ScoreHistoryPoint,
    ScoredEntity,
};
use crate::constants::STATE_FORMAT_VERSION;

/// Full engine state as six logical collections, for an external
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub evaluators: Vec<Evaluator>,
    pub consumer_weight_profiles: Vec<ConsumerWeightProfile>,
    pub scored_entities: Vec<ScoredEntity>,
    pub feedback_log: Vec<FeedbackRecord>,
    pub leaderboard_snapshots: Vec<LeaderboardSnapshot>,
    pub score_history: Vec<ScoreHistoryPoint>,
}

impl EngineState {
    pub fn empty() -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
            exported_at: Utc::now(),
            evaluators: Vec::new(),
            consumer_weight_profiles: Vec::new(),
            scored_entities: Vec::new(),
            feedback_log: Vec::new(),
            leaderboard_snapshots: Vec::new(),
            score_history: Vec::new(),
        }
    }
}

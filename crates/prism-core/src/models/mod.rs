pub mod batch;
pub mod consumer_profile;
pub mod decay;
pub mod evaluator;
pub mod factor_weights;
pub mod feedback;
pub mod history;
pub mod leaderboard;
pub mod learning;
pub mod measurement;
pub mod normalization;
pub mod scored_entity;
pub mod state;

pub use batch::{BatchFailure, BatchOutcome};
pub use consumer_profile::{ConsumerEvaluatorWeights, ConsumerWeightProfile};
pub use decay::{DecayBreakdown, PerformanceDeltaSample};
pub use evaluator::{default_evaluators, Evaluator};
pub use factor_weights::FactorWeights;
pub use feedback::{AppliedChange, FeedbackOutcome, FeedbackRecord, DEFAULT_FEEDBACK_CONFIDENCE};
pub use history::{
    HistorySummary, IssueFrequency, Mover, ScoreHistoryPoint, TrendAnalysis, TrendDirection,
    ValidationStatus,
};
pub use leaderboard::{
    EntityHighlights, EvaluatorCoverage, LeaderboardEntry, LeaderboardSnapshot,
    PerformanceMetrics, SnapshotHighlights,
};
pub use learning::{LearningOutcome, StrategyEffectiveness, WeightAdjustment};
pub use measurement::{Category, RawMeasurement, VisibilitySignals};
pub use normalization::{
    ConsistencyReport, DriftCorrection, DriftViolation, GlobalWeightUpdate, Inconsistency,
    NormalizationResult,
};
pub use scored_entity::{EvaluatorScore, ScoreDeltas, ScoredEntity};
pub use state::EngineState;

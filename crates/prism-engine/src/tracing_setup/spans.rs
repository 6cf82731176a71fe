//! Span definitions per operation: ingest, decay, learning, normalize, leaderboard, history.

/// Create an ingest span.
#[macro_export]
macro_rules! ingest_span {
    ($entity_id:expr, $evaluator_id:expr) => {
        tracing::info_span!("prism.ingest", entity_id = %$entity_id, evaluator_id = %$evaluator_id)
    };
}

/// Create a decay span.
#[macro_export]
macro_rules! decay_span {
    ($evaluator_id:expr) => {
        tracing::debug_span!("prism.decay", evaluator_id = %$evaluator_id)
    };
}

/// Create a learning span.
#[macro_export]
macro_rules! learning_span {
    ($epoch:expr, $watermark:expr) => {
        tracing::info_span!("prism.learning", epoch = $epoch, watermark = $watermark)
    };
}

/// Create a normalization span.
#[macro_export]
macro_rules! normalize_span {
    ($consumers:expr) => {
        tracing::info_span!("prism.normalize", consumers = $consumers)
    };
}

/// Create a leaderboard span.
#[macro_export]
macro_rules! leaderboard_span {
    ($entities:expr) => {
        tracing::info_span!("prism.leaderboard", entities = $entities)
    };
}

/// Create a history span.
#[macro_export]
macro_rules! history_span {
    ($operation:expr) => {
        tracing::debug_span!("prism.history", operation = %$operation)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const INGEST: &str = "prism.ingest";
    pub const DECAY: &str = "prism.decay";
    pub const LEARNING: &str = "prism.learning";
    pub const NORMALIZE: &str = "prism.normalize";
    pub const LEADERBOARD: &str = "prism.leaderboard";
    pub const HISTORY: &str = "prism.history";
}

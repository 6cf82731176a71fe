use super::WeightError;

/// Top-level error type for the Prism engine.
#[derive(Debug, thiserror::Error)]
pub enum PrismError {
    /// Malformed input: out-of-range score, NaN, empty measurement.
    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("evaluator not found: {id}")]
    EvaluatorNotFound { id: String },

    #[error("consumer not found: {id}")]
    ConsumerNotFound { id: String },

    #[error("entity not found: {id}")]
    EntityNotFound { id: String },

    /// The learner was invoked with fewer records than it needs. Non-fatal:
    /// weights stay unchanged.
    #[error("insufficient data for {evaluator_id}: {available} records, {required} required")]
    InsufficientData {
        evaluator_id: String,
        available: usize,
        required: usize,
    },

    /// Drift beyond the hard correction limit. Reported, never corrected in one step.
    #[error("consistency violation: consumer {consumer_id} drifted {drift:.3} from {evaluator_id} (limit {limit:.3})")]
    ConsistencyViolation {
        consumer_id: String,
        evaluator_id: String,
        drift: f64,
        limit: f64,
    },

    #[error("weight error: {0}")]
    WeightError(#[from] WeightError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("operation cancelled after {processed} of {total} items")]
    Cancelled { processed: usize, total: usize },
}

impl PrismError {
    /// Whether the error leaves state untouched and can be safely ignored by
    /// periodic jobs.
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            PrismError::InsufficientData { .. } | PrismError::ConsistencyViolation { .. }
        )
    }

    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        PrismError::ValidationError(message.into())
    }
}

/// Convenience alias used throughout the workspace.
pub type PrismResult<T> = Result<T, PrismError>;

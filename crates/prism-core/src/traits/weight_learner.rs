use crate::errors::PrismResult;
use crate::models::{Evaluator, FeedbackRecord, LearningOutcome};

/// Turns recorded outcomes into factor weights for one evaluator.
pub trait IWeightLearner: Send + Sync {
    /// Derive new factor weights for `evaluator` from `records`.
    /// Records for other evaluators are ignored.
    fn learn(&self, evaluator: &Evaluator, records: &[FeedbackRecord]) -> PrismResult<LearningOutcome>;
}

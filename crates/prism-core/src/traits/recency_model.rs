use crate::errors::PrismResult;
use crate::models::DecayBreakdown;

/// Staleness discount applied to freshly computed scores.
pub trait IRecencyModel: Send + Sync {
    /// Discount `score` for content that is `content_age_days` old, at the
    /// evaluator's `recency_sensitivity`.
    fn adjust_for_recency(
        &self,
        score: f64,
        content_age_days: f64,
        recency_sensitivity: f64,
    ) -> PrismResult<DecayBreakdown>;
}

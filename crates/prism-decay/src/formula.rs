use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::DecayBreakdown;

/// Recency adjustment.
///
/// ```text
/// age_factor  = min(age / decay_period, 1)
/// degradation = age_factor × max_degradation × sensitivity
/// adjusted    = max(score × (1 − degradation), score × (1 − max_degradation))
/// ```
///
/// Negative ages count as 0. Non-finite inputs and negative sensitivities
/// are rejected.
pub fn compute(
    score: f64,
    content_age_days: f64,
    recency_sensitivity: f64,
    decay_period_days: f64,
    max_degradation: f64,
) -> PrismResult<DecayBreakdown> {
    if !score.is_finite() {
        return Err(PrismError::validation(format!("score is not finite: {score}")));
    }
    if !content_age_days.is_finite() {
        return Err(PrismError::validation(format!(
            "content age is not finite: {content_age_days}"
        )));
    }
    if !recency_sensitivity.is_finite() || recency_sensitivity < 0.0 {
        return Err(PrismError::validation(format!(
            "recency sensitivity must be finite and non-negative, got {recency_sensitivity}"
        )));
    }

    let age = content_age_days.max(0.0);
    let age_factor = (age / decay_period_days).min(1.0);
    let degradation = age_factor * max_degradation * recency_sensitivity;
    let floor = score * (1.0 - max_degradation);
    let adjusted = (score * (1.0 - degradation)).max(floor);

    Ok(DecayBreakdown {
        base_score: score,
        age_factor,
        degradation,
        floor,
        adjusted_score: adjusted,
    })
}

use prism_core::config::NormalizerConfig;
use prism_core::errors::{PrismError, PrismResult};

/// `|consumer − global| / global`. The global weight must be positive.
pub fn drift_factor(consumer: f64, global: f64) -> PrismResult<f64> {
    if !global.is_finite() || global <= 0.0 {
        return Err(PrismError::validation(format!(
            "global weight must be positive, got {global}"
        )));
    }
    if !consumer.is_finite() {
        return Err(PrismError::validation(format!(
            "consumer weight must be finite, got {consumer}"
        )));
    }
    Ok((consumer - global).abs() / global)
}

/// One correction step for one consumer weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub drift: f64,
    pub new_weight: f64,
    /// `None` when the drift was within the threshold.
    pub factor: Option<f64>,
    /// Drift exceeded the hard correction limit.
    pub exceeds_limit: bool,
}

/// Move a consumer weight halfway back toward the global weight.
///
/// Above global the factor is `1 − 0.5 × drift`, below it is `1 + 0.5 × drift`,
/// with drift capped at the hard correction limit. The result is clamped to the
/// consumer weight bounds.
pub fn half_correction(consumer: f64, global: f64, config: &NormalizerConfig) -> PrismResult<Correction> {
    let drift = drift_factor(consumer, global)?;
    let exceeds_limit = drift > config.hard_correction_limit;

    if drift <= config.drift_threshold {
        return Ok(Correction {
            drift,
            new_weight: consumer,
            factor: None,
            exceeds_limit,
        });
    }

    let capped = drift.min(config.hard_correction_limit);
    let factor = if consumer > global {
        1.0 - 0.5 * capped
    } else {
        1.0 + 0.5 * capped
    };
    let new_weight =
        (consumer * factor).clamp(config.min_consumer_weight, config.max_consumer_weight);

    Ok(Correction {
        drift,
        new_weight,
        factor: Some(factor),
        exceeds_limit,
    })
}

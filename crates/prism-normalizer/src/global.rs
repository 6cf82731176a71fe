use prism_core::config::NormalizerConfig;
use prism_core::constants::{MAX_SCORE, MIN_SCORE};
use prism_core::errors::{PrismError, PrismResult};

/// Mean of 0–100 performance samples mapped onto [0, 1]. `None` for no samples.
pub fn normalized_performance(samples: &[f64]) -> PrismResult<Option<f64>> {
    if samples.is_empty() {
        return Ok(None);
    }
    for s in samples {
        if !s.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(s) {
            return Err(PrismError::validation(format!(
                "performance sample {s} outside [{MIN_SCORE}, {MAX_SCORE}]"
            )));
        }
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    Ok(Some((mean / MAX_SCORE).clamp(0.0, 1.0)))
}

/// `base_weight × (0.8 + 0.4 × normalized)`, clamped to the global bounds.
pub fn canonical_weight(base_weight: f64, normalized: f64, config: &NormalizerConfig) -> f64 {
    (base_weight * (0.8 + 0.4 * normalized)).clamp(config.min_global_weight, config.max_global_weight)
}

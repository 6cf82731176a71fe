use prism_core::config::DecayConfig;
use prism_core::errors::PrismResult;
use prism_core::models::{DecayBreakdown, Evaluator};
use prism_core::traits::IRecencyModel;
use tracing::debug;

use crate::formula;
use crate::samples::RecencySampleLog;

/// Samples needed before a sensitivity suggestion is offered.
pub const MIN_SAMPLES_FOR_SUGGESTION: usize = 5;

/// Upper bound for suggested sensitivities.
const MAX_SUGGESTED_SENSITIVITY: f64 = 2.0;

/// Discounts scores for content age at evaluator-specific rates.
///
/// Never mutates an evaluator's sensitivity; [`TemporalDecayModel::suggest_sensitivity`]
/// is advisory and the caller decides whether to apply it.
#[derive(Debug, Clone)]
pub struct TemporalDecayModel {
    config: DecayConfig,
}

impl TemporalDecayModel {
    /// Create a model with the default 180-day period and 0.3 max degradation.
    pub fn new() -> Self {
        Self {
            config: DecayConfig::default(),
        }
    }

    pub fn with_config(config: DecayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    pub fn decay_period_days(&self) -> f64 {
        self.config.decay_period_days
    }

    pub fn max_degradation(&self) -> f64 {
        self.config.max_degradation
    }

    /// Adjust using the evaluator's own sensitivity.
    pub fn adjust_for_evaluator(
        &self,
        score: f64,
        content_age_days: f64,
        evaluator: &Evaluator,
    ) -> PrismResult<DecayBreakdown> {
        self.adjust_for_recency(score, content_age_days, evaluator.recency_sensitivity)
    }

    /// Sensitivity implied by the logged samples, moved halfway from
    /// `current`. `None` until enough aged samples exist.
    pub fn suggest_sensitivity(
        &self,
        log: &RecencySampleLog,
        evaluator_id: &str,
        current: f64,
    ) -> Option<f64> {
        let implied: Vec<f64> = log
            .samples_for(evaluator_id)
            .filter_map(|s| {
                let age_factor = (s.content_age_days.max(0.0) / self.config.decay_period_days).min(1.0);
                let scale = age_factor * self.config.max_degradation;
                if scale <= f64::EPSILON {
                    None
                } else {
                    Some((s.relative_drop() / scale).clamp(0.0, MAX_SUGGESTED_SENSITIVITY))
                }
            })
            .collect();

        if implied.len() < MIN_SAMPLES_FOR_SUGGESTION {
            return None;
        }

        let mean = implied.iter().sum::<f64>() / implied.len() as f64;
        let suggestion = current + 0.5 * (mean - current);
        debug!(
            evaluator_id,
            samples = implied.len(),
            implied_mean = mean,
            suggestion,
            "recency sensitivity suggestion"
        );
        Some(suggestion.clamp(0.0, MAX_SUGGESTED_SENSITIVITY))
    }
}

impl Default for TemporalDecayModel {
    fn default() -> Self {
        Self::new()
    }
}

impl IRecencyModel for TemporalDecayModel {
    fn adjust_for_recency(
        &self,
        score: f64,
        content_age_days: f64,
        recency_sensitivity: f64,
    ) -> PrismResult<DecayBreakdown> {
        formula::compute(
            score,
            content_age_days,
            recency_sensitivity,
            self.config.decay_period_days,
            self.config.max_degradation,
        )
    }
}

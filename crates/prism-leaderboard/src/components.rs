use prism_core::config::{ComponentWeights, LeaderboardConfig};
use prism_core::constants::{clamp_score, MAX_SCORE};
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::EvaluatorScore;

/// Leaderboard components for one (entity, evaluator) pair. `None` means the
/// signal was not reported and is left out of the average.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentScores {
    pub citation: Option<f64>,
    pub inclusion: Option<f64>,
    pub confidence: Option<f64>,
    pub response_time: Option<f64>,
    pub quality: Option<f64>,
}

impl ComponentScores {
    pub fn from_score(score: &EvaluatorScore, config: &LeaderboardConfig) -> PrismResult<Self> {
        if !score.adjusted_score.is_finite() {
            return Err(PrismError::validation(format!(
                "stored score for {} is not finite",
                score.evaluator_id
            )));
        }
        let mut components = ComponentScores {
            quality: Some(clamp_score(score.adjusted_score)),
            ..Default::default()
        };
        let Some(v) = &score.visibility else {
            return Ok(components);
        };
        v.validate()?;

        let cap = f64::from(config.citation_cap.max(1));
        components.citation = Some((f64::from(v.citation_count) / cap).min(1.0) * MAX_SCORE);
        components.inclusion = Some(if v.included { MAX_SCORE } else { 0.0 });
        components.confidence = Some(v.confidence * MAX_SCORE);
        components.response_time = v
            .response_time_ms
            .map(|ms| (MAX_SCORE * (1.0 - ms / config.max_response_ms)).max(0.0));
        Ok(components)
    }

    /// Weighted mean over the present components. `None` when nothing with a
    /// positive weight is present.
    pub fn weighted(&self, weights: &ComponentWeights) -> Option<f64> {
        let pairs = [
            (self.citation, weights.citation),
            (self.inclusion, weights.inclusion),
            (self.confidence, weights.confidence),
            (self.response_time, weights.response_time),
            (self.quality, weights.quality),
        ];
        let (num, den) = pairs
            .iter()
            .filter_map(|(score, weight)| score.map(|s| (s, *weight)))
            .filter(|(_, w)| *w > 0.0)
            .fold((0.0, 0.0), |(n, d), (s, w)| (n + s * w, d + w));
        if den > 0.0 {
            Some(num / den)
        } else {
            None
        }
    }
}

/// Component average × the evaluator's canonical weight, clipped to [0, 100].
pub fn evaluator_leaderboard_score(
    score: &EvaluatorScore,
    evaluator_weight: f64,
    config: &LeaderboardConfig,
) -> PrismResult<Option<f64>> {
    if !evaluator_weight.is_finite() || evaluator_weight < 0.0 {
        return Err(PrismError::validation(format!(
            "evaluator weight {evaluator_weight} must be finite and non-negative"
        )));
    }
    let components = ComponentScores::from_score(score, config)?;
    Ok(components
        .weighted(&config.component_weights)
        .map(|s| clamp_score(s * evaluator_weight)))
}

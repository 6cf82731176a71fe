//! Weighted averages over partially present inputs.
//!
//! Normalization policy: an input that is missing, or whose weight is zero,
//! is left out of both the numerator and the denominator. It is never
//! counted as a zero score. When nothing remains the result is `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use prism_core::config::CategoryWeights;
use prism_core::constants::{clamp_score, MAX_SCORE, MIN_SCORE};
use prism_core::errors::{PrismError, PrismResult};
use prism_core::models::{Category, FactorWeights};

/// A composite plus how it was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// Weighted average, clipped to [0, 100].
    pub value: f64,
    /// Share of the total category weight that had a score, [0, 1].
    pub coverage: f64,
    /// Category → points it contributed to `value`.
    pub contributions: BTreeMap<Category, f64>,
}

fn check_score(name: &str, score: f64) -> PrismResult<()> {
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(PrismError::validation(format!(
            "{name} score {score} outside [{MIN_SCORE}, {MAX_SCORE}]"
        )));
    }
    Ok(())
}

/// Weighted average of the present category scores, clipped to [0, 100].
pub fn compute_composite(
    category_scores: &BTreeMap<Category, f64>,
    weights: &CategoryWeights,
) -> PrismResult<Option<CompositeScore>> {
    weights.validate()?;
    for (category, score) in category_scores {
        check_score(category.as_str(), *score)?;
    }

    let denominator: f64 = category_scores
        .keys()
        .map(|c| weights.weight(*c))
        .sum();
    if denominator <= 0.0 {
        return Ok(None);
    }

    let contributions: BTreeMap<Category, f64> = category_scores
        .iter()
        .filter(|(c, _)| weights.weight(**c) > 0.0)
        .map(|(c, s)| (*c, s * weights.weight(*c) / denominator))
        .collect();
    let value = clamp_score(contributions.values().sum());

    Ok(Some(CompositeScore {
        value,
        coverage: (denominator / weights.total()).min(1.0),
        contributions,
    }))
}

/// Weighted average of factor scores under an evaluator's factor weights.
///
/// Factors without a weight entry carry no weight and are ignored.
pub fn evaluator_score(
    factor_scores: &BTreeMap<String, f64>,
    weights: &FactorWeights,
) -> PrismResult<Option<f64>> {
    weights.validate()?;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (factor, score) in factor_scores {
        check_score(factor, *score)?;
        if let Some(w) = weights.get(factor) {
            numerator += score * w;
            denominator += w;
        }
    }
    if denominator <= 0.0 {
        return Ok(None);
    }
    Ok(Some(clamp_score(numerator / denominator)))
}

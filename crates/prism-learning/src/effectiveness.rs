use std::collections::BTreeMap;

use prism_core::models::{FeedbackOutcome, FeedbackRecord, StrategyEffectiveness};

/// Per change type: average impact, how often it was applied, and the
/// outcomes of the records it appeared in.
///
/// Sorted by average impact descending, then by name.
pub fn strategy_effectiveness<'a>(
    records: impl IntoIterator<Item = &'a FeedbackRecord>,
) -> Vec<StrategyEffectiveness> {
    let mut by_type: BTreeMap<&str, StrategyEffectiveness> = BTreeMap::new();
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for record in records {
        for change in record.changes.iter().filter(|c| c.applied) {
            let stats = by_type
                .entry(change.change_type.as_str())
                .or_insert_with(|| StrategyEffectiveness {
                    change_type: change.change_type.clone(),
                    average_impact: 0.0,
                    applications: 0,
                    positive: 0,
                    negative: 0,
                    neutral: 0,
                });
            stats.applications += 1;
            match record.outcome {
                FeedbackOutcome::Positive => stats.positive += 1,
                FeedbackOutcome::Negative => stats.negative += 1,
                FeedbackOutcome::Neutral => stats.neutral += 1,
            }
            *totals.entry(change.change_type.as_str()).or_insert(0.0) += change.impact;
        }
    }

    let mut result: Vec<StrategyEffectiveness> = by_type
        .into_iter()
        .map(|(name, mut stats)| {
            let total = totals.get(name).copied().unwrap_or(0.0);
            stats.average_impact = total / stats.applications as f64;
            stats
        })
        .collect();

    result.sort_by(|a, b| {
        b.average_impact
            .total_cmp(&a.average_impact)
            .then_with(|| a.change_type.cmp(&b.change_type))
    });
    result
}

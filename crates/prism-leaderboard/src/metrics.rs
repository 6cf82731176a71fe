use std::collections::BTreeMap;

use prism_core::models::{EvaluatorCoverage, LeaderboardEntry, PerformanceMetrics};

/// Statistics over the ranked entries plus the entity accounting of one rebuild.
pub fn compute(
    entries: &[LeaderboardEntry],
    total_entities: usize,
    excluded_entities: usize,
    failed_entities: usize,
) -> PerformanceMetrics {
    let mut scores: Vec<f64> = entries.iter().map(|e| e.composite_score).collect();
    scores.sort_by(f64::total_cmp);

    let mean_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    let median_score = match scores.len() {
        0 => 0.0,
        n if n % 2 == 1 => scores[n / 2],
        n => (scores[n / 2 - 1] + scores[n / 2]) / 2.0,
    };
    let top_score = scores.last().copied().unwrap_or(0.0);

    let mut coverage: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for entry in entries {
        for (evaluator_id, score) in &entry.evaluator_scores {
            let c = coverage.entry(evaluator_id.as_str()).or_insert((0, 0.0));
            c.0 += 1;
            c.1 += score;
        }
    }

    PerformanceMetrics {
        total_entities,
        ranked_entities: entries.len(),
        excluded_entities,
        failed_entities,
        mean_score,
        median_score,
        top_score,
        evaluator_coverage: coverage
            .into_iter()
            .map(|(id, (n, sum))| EvaluatorCoverage {
                evaluator_id: id.to_string(),
                entities: n,
                mean_score: sum / n as f64,
            })
            .collect(),
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use prism_core::config::HistoryConfig;
use prism_core::models::{
    HistorySummary, IssueFrequency, Mover, ScoreHistoryPoint, TrendDirection, ValidationStatus,
};

use crate::store::trend_over;

pub(crate) fn build(
    entries: &[(String, Vec<ScoreHistoryPoint>)],
    window_days: i64,
    now: DateTime<Utc>,
    config: &HistoryConfig,
) -> HistorySummary {
    let tracked: Vec<&(String, Vec<ScoreHistoryPoint>)> =
        entries.iter().filter(|(_, p)| !p.is_empty()).collect();
    if tracked.is_empty() {
        return HistorySummary::default();
    }

    let total_points: usize = tracked.iter().map(|(_, p)| p.len()).sum();
    let validated = tracked
        .iter()
        .flat_map(|(_, p)| p.iter())
        .filter(|p| p.validation == ValidationStatus::Validated)
        .count();

    let mut latest_sum = 0.0;
    let mut sub_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (_, points) in &tracked {
        if let Some(latest) = points.last() {
            latest_sum += latest.composite_score;
            for (evaluator_id, score) in &latest.sub_scores {
                let e = sub_sums.entry(evaluator_id.clone()).or_insert((0.0, 0));
                e.0 += score;
                e.1 += 1;
            }
        }
    }

    let mut improving = Vec::new();
    let mut declining = Vec::new();
    for (entity_id, points) in &tracked {
        let trend = trend_over(entity_id, points, window_days, now, config.trend_threshold_percent);
        let (Some(start_score), Some(end_score)) = (trend.start_score, trend.end_score) else {
            continue;
        };
        let mover = Mover {
            entity_id: entity_id.clone(),
            start_score,
            end_score,
            percent_change: trend.percent_change,
        };
        match trend.direction {
            TrendDirection::Improving => improving.push(mover),
            TrendDirection::Declining => declining.push(mover),
            TrendDirection::Stable => {}
        }
    }
    improving.sort_by(|a, b| {
        b.percent_change
            .total_cmp(&a.percent_change)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    declining.sort_by(|a, b| {
        a.percent_change
            .total_cmp(&b.percent_change)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    improving.truncate(config.top_movers);
    declining.truncate(config.top_movers);

    let window_start = now - Duration::days(window_days);
    let mut issue_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for point in tracked
        .iter()
        .flat_map(|(_, p)| p.iter())
        .filter(|p| p.timestamp >= window_start && p.timestamp <= now)
    {
        for issue in &point.issues {
            *issue_counts.entry(issue.as_str()).or_insert(0) += 1;
        }
    }
    let mut common_issues: Vec<IssueFrequency> = issue_counts
        .into_iter()
        .map(|(issue, count)| IssueFrequency {
            issue: issue.to_string(),
            count,
        })
        .collect();
    common_issues.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.issue.cmp(&b.issue)));

    HistorySummary {
        tracked_entities: tracked.len(),
        total_points,
        average_score: latest_sum / tracked.len() as f64,
        average_sub_scores: sub_sums
            .into_iter()
            .map(|(id, (sum, n))| (id, sum / n as f64))
            .collect(),
        validation_rate: validated as f64 / total_points as f64,
        top_improving: improving,
        top_declining: declining,
        common_issues,
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use prism_core::models::{ScoreHistoryPoint, TrendDirection, ValidationStatus};
use prism_history::{classify, percent_change, ScoreHistory};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

fn point(days_ago: i64, score: f64) -> ScoreHistoryPoint {
    ScoreHistoryPoint {
        entity_id: "e".to_string(),
        timestamp: now() - Duration::days(days_ago),
        composite_score: score,
        sub_scores: BTreeMap::from([("claude".to_string(), score)]),
        validation: ValidationStatus::Unvalidated,
        issues: Vec::new(),
    }
}

fn rank(direction: TrendDirection) -> u8 {
    match direction {
        TrendDirection::Declining => 0,
        TrendDirection::Stable => 1,
        TrendDirection::Improving => 2,
    }
}

// ── Classification order ────────────────────────────────────────────────

proptest! {
    #[test]
    fn classification_is_monotone_in_percent_change(
        a in -500.0f64..500.0,
        b in -500.0f64..500.0,
        threshold in 0.0f64..50.0,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(classify(low, threshold)) <= rank(classify(high, threshold)));
    }

    #[test]
    fn percent_change_has_the_sign_of_the_move(start in 0.0f64..=100.0, end in 0.0f64..=100.0) {
        let pct = percent_change(start, end);
        prop_assert_eq!(pct > 0.0, end > start);
        prop_assert_eq!(pct < 0.0, end < start);
    }

    #[test]
    fn a_rising_history_never_declines(start in 0.0f64..=100.0, rise in 0.0f64..=100.0) {
        let end = (start + rise).min(100.0);
        let h = ScoreHistory::new();
        h.append(point(10, start)).unwrap();
        h.append(point(1, end)).unwrap();

        let trend = h.calculate_trend_at("e", 30, now()).unwrap();
        prop_assert!(trend.sufficient_data);
        prop_assert_ne!(trend.direction, TrendDirection::Declining);
        prop_assert_eq!(trend.direction, classify(percent_change(start, end), 5.0));
    }
}

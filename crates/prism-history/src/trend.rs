use prism_core::models::TrendDirection;

/// Percent change from `start` to `end`.
///
/// A zero baseline has no meaningful ratio: +100 if the score rose, −100 if it
/// fell, 0 if it stayed at zero.
pub fn percent_change(start: f64, end: f64) -> f64 {
    if start == 0.0 {
        if end > 0.0 {
            100.0
        } else if end < 0.0 {
            -100.0
        } else {
            0.0
        }
    } else {
        (end - start) / start.abs() * 100.0
    }
}

/// `≥ +threshold` improving, `≤ −threshold` declining, stable otherwise.
pub fn classify(percent: f64, threshold_percent: f64) -> TrendDirection {
    if percent >= threshold_percent {
        TrendDirection::Improving
    } else if percent <= -threshold_percent {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

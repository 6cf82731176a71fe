use std::collections::BTreeMap;

use prism_core::models::FeedbackRecord;

/// Summed impact of one change type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImpactAggregate {
    pub total_impact: f64,
    pub samples: usize,
}

impl ImpactAggregate {
    pub fn average(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_impact / self.samples as f64
        }
    }
}

/// Group the applied changes of `records` by change type.
///
/// Changes with `applied = false` are ignored. The map is ordered by change
/// type name, which fixes the order weights are moved in.
pub fn aggregate_impacts<'a>(
    records: impl IntoIterator<Item = &'a FeedbackRecord>,
) -> BTreeMap<String, ImpactAggregate> {
    let mut groups: BTreeMap<String, ImpactAggregate> = BTreeMap::new();
    for record in records {
        for change in record.changes.iter().filter(|c| c.applied) {
            let entry = groups.entry(change.change_type.clone()).or_default();
            entry.total_impact += change.impact;
            entry.samples += 1;
        }
    }
    groups
}

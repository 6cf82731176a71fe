use std::collections::BTreeMap;

use prism_core::models::{EntityHighlights, LeaderboardEntry, SnapshotHighlights};

/// Highest-scoring evaluator, ties broken by id.
pub fn top_evaluator(scores: &BTreeMap<String, f64>) -> Option<String> {
    // BTreeMap iterates by id, so keeping the first maximum breaks ties.
    let mut best: Option<(&String, f64)> = None;
    for (id, score) in scores {
        if best.map_or(true, |(_, b)| *score > b) {
            best = Some((id, *score));
        }
    }
    best.map(|(id, _)| id.clone())
}

/// Evaluator group with the highest mean score, ties broken by group name.
pub fn best_group(scores: &BTreeMap<String, f64>, groups: &BTreeMap<String, String>) -> Option<String> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (evaluator_id, score) in scores {
        if let Some(group) = groups.get(evaluator_id) {
            let e = sums.entry(group.as_str()).or_insert((0.0, 0));
            e.0 += score;
            e.1 += 1;
        }
    }
    let means: BTreeMap<String, f64> = sums
        .into_iter()
        .map(|(g, (sum, n))| (g.to_string(), sum / n as f64))
        .collect();
    top_evaluator(&means)
}

/// Entry with the strictly greatest `key`, ties broken by entity id.
/// Entries whose key is zero never lead.
fn leader_by<F>(entries: &[LeaderboardEntry], key: F) -> Option<String>
where
    F: Fn(&LeaderboardEntry) -> f64,
{
    entries
        .iter()
        .filter(|e| key(*e) > 0.0)
        .min_by(|a, b| {
            key(*b)
                .total_cmp(&key(*a))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        })
        .map(|e| e.entity_id.clone())
}

/// Fill the cross-entry highlight flags and return the snapshot-level ones.
/// Expects `entries` ranked.
pub fn apply(entries: &mut [LeaderboardEntry]) -> SnapshotHighlights {
    let citation_leader = leader_by(entries, |e| f64::from(e.total_citations));
    let inclusion_leader = leader_by(entries, |e| e.inclusion_rate);
    let biggest_climber = entries
        .iter()
        .filter_map(|e| e.rank_change.filter(|c| *c > 0).map(|c| (c, &e.entity_id)))
        .min_by(|(ca, ia), (cb, ib)| cb.cmp(ca).then_with(|| ia.cmp(ib)))
        .map(|(_, id)| id.clone());

    for entry in entries.iter_mut() {
        entry.highlights.citation_leader = citation_leader.as_deref() == Some(entry.entity_id.as_str());
        entry.highlights.inclusion_leader =
            inclusion_leader.as_deref() == Some(entry.entity_id.as_str());
    }

    SnapshotHighlights {
        top_entity: entries.first().map(|e| e.entity_id.clone()),
        citation_leader,
        inclusion_leader,
        biggest_climber,
    }
}

/// Per-entry highlights that depend only on the entry itself.
pub fn entity_highlights(
    scores: &BTreeMap<String, f64>,
    groups: &BTreeMap<String, String>,
    composite: f64,
    high_performer_threshold: f64,
) -> EntityHighlights {
    EntityHighlights {
        top_evaluator: top_evaluator(scores),
        best_group: best_group(scores, groups),
        citation_leader: false,
        inclusion_leader: false,
        high_performer: composite >= high_performer_threshold,
    }
}

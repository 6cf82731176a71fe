use std::sync::atomic::AtomicBool;

use chrono::Duration;
use prism_core::config::LeaderboardConfig;
use prism_core::PrismError;
use prism_leaderboard::{stale_entity_ids, Leaderboard, SnapshotRing};
use test_fixtures::{
    evaluator_map, evaluator_score, leaderboard_entities, reference_now, scored_entity, visibility,
};

// ── Ranking ─────────────────────────────────────────────────────────────

#[test]
fn ranks_are_dense_and_ties_break_by_id() {
    let board = Leaderboard::new();
    let build = board
        .rebuild(&leaderboard_entities(reference_now()), &evaluator_map(), None)
        .unwrap();
    let entries = &build.snapshot.entries;

    let ranks: Vec<usize> = entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    for pair in entries.windows(2) {
        assert!(pair[0].composite_score >= pair[1].composite_score);
    }

    // beta and epsilon carry identical scores.
    let beta = build.snapshot.rank_of("https://beta.example/post").unwrap();
    let epsilon = build.snapshot.rank_of("https://epsilon.example/landing").unwrap();
    assert_eq!(epsilon, beta + 1);
    assert!(build.failures.is_empty());
}

#[test]
fn identical_inputs_give_identical_snapshots() {
    let board = Leaderboard::new();
    let entities = leaderboard_entities(reference_now());
    let evaluators = evaluator_map();
    let a = board.rebuild(&entities, &evaluators, None).unwrap();
    let b = board.rebuild(&entities, &evaluators, None).unwrap();

    assert_eq!(a.snapshot.fingerprint, b.snapshot.fingerprint);
    assert_eq!(a.snapshot.entries, b.snapshot.entries);
    assert_eq!(a.snapshot.highlights, b.snapshot.highlights);
    assert_ne!(a.snapshot.id, b.snapshot.id);
}

#[test]
fn evaluator_weight_scales_scores() {
    let board = Leaderboard::new();
    let mut evaluators = evaluator_map();
    evaluators.get_mut("claude").unwrap().current_weight = 0.5;
    let entity = scored_entity("e", &[("claude", 80.0)], reference_now());
    let build = board.rebuild(&[entity], &evaluators, None).unwrap();
    assert!((build.snapshot.entries[0].composite_score - 40.0).abs() < 1e-9);
}

#[test]
fn entities_below_min_score_are_excluded() {
    let board = Leaderboard::with_config(LeaderboardConfig {
        min_score: 60.0,
        ..Default::default()
    });
    let build = board
        .rebuild(&leaderboard_entities(reference_now()), &evaluator_map(), None)
        .unwrap();
    assert_eq!(build.metrics.excluded_entities, 1);
    assert_eq!(build.metrics.ranked_entities, 4);
    assert!(build.snapshot.rank_of("https://delta.example/docs").is_none());
}

// ── Failures and cancellation ───────────────────────────────────────────

#[test]
fn unknown_evaluator_fails_only_that_entity() {
    let board = Leaderboard::new();
    let mut entities = leaderboard_entities(reference_now());
    entities.push(scored_entity("https://zeta.example", &[("bard", 90.0)], reference_now()));

    let build = board.rebuild(&entities, &evaluator_map(), None).unwrap();
    assert_eq!(build.failures.len(), 1);
    assert_eq!(build.failures[0].key, "https://zeta.example");
    assert_eq!(build.metrics.ranked_entities, 5);
    assert_eq!(build.metrics.failed_entities, 1);
}

#[test]
fn cancelled_rebuild_returns_cancelled() {
    let board = Leaderboard::with_config(LeaderboardConfig {
        chunk_size: 2,
        ..Default::default()
    });
    let cancel = AtomicBool::new(true);
    let err = board
        .rebuild_chunked(&leaderboard_entities(reference_now()), &evaluator_map(), None, &cancel)
        .unwrap_err();
    assert!(matches!(err, PrismError::Cancelled { processed: 0, total: 5 }));
}

#[test]
fn chunked_rebuild_matches_single_pass() {
    let entities = leaderboard_entities(reference_now());
    let evaluators = evaluator_map();
    let single = Leaderboard::new().rebuild(&entities, &evaluators, None).unwrap();
    let chunked = Leaderboard::with_config(LeaderboardConfig {
        chunk_size: 2,
        ..Default::default()
    })
    .rebuild_chunked(&entities, &evaluators, None, &AtomicBool::new(false))
    .unwrap();
    assert_eq!(single.snapshot.fingerprint, chunked.snapshot.fingerprint);
}

// ── Highlights and rank change ──────────────────────────────────────────

#[test]
fn highlights_identify_leaders() {
    let now = reference_now();
    let mut cited = scored_entity("a", &[], now);
    cited.upsert_score(evaluator_score("claude", 50.0, Some(visibility(4, false, 0.5, None)), now));
    let mut included = scored_entity("b", &[], now);
    included.upsert_score(evaluator_score("gemini", 95.0, Some(visibility(1, true, 0.9, Some(100.0))), now));

    let build = Leaderboard::new()
        .rebuild(&[cited, included], &evaluator_map(), None)
        .unwrap();
    let h = &build.snapshot.highlights;
    assert_eq!(h.citation_leader.as_deref(), Some("a"));
    assert_eq!(h.inclusion_leader.as_deref(), Some("b"));
    assert_eq!(h.top_entity.as_deref(), Some("b"));

    let b = &build.snapshot.entries[0];
    assert_eq!(b.highlights.top_evaluator.as_deref(), Some("gemini"));
    assert_eq!(b.highlights.best_group.as_deref(), Some("search"));
    assert!(b.highlights.inclusion_leader);
    assert!(!b.highlights.citation_leader);
}

#[test]
fn rank_change_is_relative_to_previous_snapshot() {
    let now = reference_now();
    let evaluators = evaluator_map();
    let board = Leaderboard::new();
    let first = board
        .rebuild(
            &[
                scored_entity("a", &[("claude", 90.0)], now),
                scored_entity("b", &[("claude", 50.0)], now),
            ],
            &evaluators,
            None,
        )
        .unwrap();
    let second = board
        .rebuild(
            &[
                scored_entity("a", &[("claude", 40.0)], now),
                scored_entity("b", &[("claude", 60.0)], now),
                scored_entity("c", &[("claude", 10.0)], now),
            ],
            &evaluators,
            Some(&first.snapshot),
        )
        .unwrap();

    let entry = |id: &str| second.snapshot.entries.iter().find(|e| e.entity_id == id).unwrap();
    assert_eq!(entry("b").rank_change, Some(1));
    assert_eq!(entry("a").rank_change, Some(-1));
    assert_eq!(entry("c").rank_change, None);
    assert_eq!(second.snapshot.highlights.biggest_climber.as_deref(), Some("b"));
}

#[test]
fn rank_change_covers_every_entry_of_a_large_snapshot() {
    const N: usize = 10_000;
    let now = reference_now();
    let evaluators = evaluator_map();
    let board = Leaderboard::new();
    let entities = |reversed: bool| -> Vec<_> {
        (0..N)
            .map(|i| {
                let base = i as f64 * 100.0 / N as f64;
                let score = if reversed { 100.0 - base } else { base };
                scored_entity(&format!("e{i:05}"), &[("claude", score)], now)
            })
            .collect()
    };

    let first = board.rebuild(&entities(false), &evaluators, None).unwrap();
    let second = board
        .rebuild(&entities(true), &evaluators, Some(&first.snapshot))
        .unwrap();

    let previous = first.snapshot.rank_index();
    assert_eq!(previous.len(), N);
    for entry in &second.snapshot.entries {
        let i: usize = entry.entity_id[1..].parse().unwrap();
        assert_eq!(previous[entry.entity_id.as_str()], N - i);
        assert_eq!(entry.rank, i + 1);
        assert_eq!(entry.rank_change, Some((N - i) as i64 - (i + 1) as i64));
    }
}

// ── Metrics, retention and snapshot ring ────────────────────────────────

#[test]
fn metrics_cover_ranked_entries() {
    let build = Leaderboard::new()
        .rebuild(&leaderboard_entities(reference_now()), &evaluator_map(), None)
        .unwrap();
    let m = &build.metrics;
    assert_eq!(m.total_entities, 5);
    assert!(m.top_score >= m.median_score);
    let perplexity = m
        .evaluator_coverage
        .iter()
        .find(|c| c.evaluator_id == "perplexity")
        .unwrap();
    assert_eq!(perplexity.entities, 3);
    assert_eq!(build.snapshot.metrics, build.metrics);
}

#[test]
fn stale_entities_are_listed_for_pruning() {
    let now = reference_now();
    let entities = vec![
        scored_entity("old", &[("claude", 50.0)], now - Duration::days(120)),
        scored_entity("new", &[("claude", 50.0)], now - Duration::days(10)),
    ];
    assert_eq!(stale_entity_ids(&entities, now, 90), vec!["old".to_string()]);
}

#[test]
fn snapshot_ring_evicts_oldest() {
    let board = Leaderboard::new();
    let entities = leaderboard_entities(reference_now());
    let evaluators = evaluator_map();
    let mut ring = SnapshotRing::new(2);
    let mut ids = Vec::new();
    for _ in 0..3 {
        let build = board.rebuild(&entities, &evaluators, ring.latest()).unwrap();
        ids.push(build.snapshot.id.clone());
        ring.push(build.snapshot);
    }
    assert_eq!(ring.len(), 2);
    let kept: Vec<&str> = ring.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(kept, vec![ids[1].as_str(), ids[2].as_str()]);
}

//! End-to-end cycle tests for the prediction engine.
//!
//! These drive the public API the way the binary does: simulated feeds
//! realize draws, the engine verifies outstanding predictions against them
//! and commits fresh ones, cycle after cycle.

use draw_predictor::config::{TOP_CANDIDATES, VERIFICATION_LOG_CAP};
use draw_predictor::engine::PredictionEngine;
use draw_predictor::simulator::FeedSimulator;
use draw_predictor::snapshot::EngineSnapshot;
use draw_predictor::types::{DrawRecord, FeedId};

fn batch(sim: &FeedSimulator) -> (FeedId, Vec<DrawRecord>) {
    (sim.feed().to_string(), sim.history().to_vec())
}

// =============================================================================
// CLOSED LOOP: PREDICT -> DRAW ARRIVES -> VERIFY
// =============================================================================

#[test]
fn test_closed_loop_verifies_committed_predictions() {
    let mut engine = PredictionEngine::new();
    let mut sim = FeedSimulator::new("alpha", 11, 100, 20);

    // First cycle: prediction committed, nothing to verify yet.
    let reports = engine.run_cycle(&[batch(&sim)]);
    let first = &reports[0];
    assert!(first.verifications.is_empty());
    assert!(first.committed_new);
    let target = first.summary.as_ref().expect("summary").period.clone();

    // The committed target is exactly the next period the simulator realizes.
    sim.advance();
    assert_eq!(sim.history().last().expect("draw").period, target);

    let reports = engine.run_cycle(&[batch(&sim)]);
    let second = &reports[0];
    assert_eq!(second.verifications.len(), 1);
    assert_eq!(second.verifications[0].period, target);
    assert_eq!(second.streak.total_predictions, 1);

    // The verification outcome matches the realized digit.
    let v = &second.verifications[0];
    let digit = sim
        .history()
        .last()
        .and_then(|r| r.digit(v.descriptor.position))
        .expect("digit");
    let actual = draw_predictor::types::Label::of(v.descriptor.label.axis(), digit);
    assert_eq!(v.actual, actual);
    assert_eq!(v.correct, v.descriptor.label == actual);
}

#[test]
fn test_streaks_and_log_accumulate_over_many_cycles() {
    let mut engine = PredictionEngine::new();
    let mut sim = FeedSimulator::new("alpha", 23, 100, 20);

    let mut verified_total = 0;
    for _ in 0..50 {
        let reports = engine.run_cycle(&[batch(&sim)]);
        verified_total += reports[0].verifications.len();
        sim.advance();
    }

    // One verification per cycle once the loop is primed.
    assert_eq!(verified_total, 49);
    let streak = engine.streak("alpha");
    assert_eq!(streak.total_predictions, 49);
    assert!(streak.total_wins <= streak.total_predictions);
    assert!(streak.max_win_streak >= streak.current_win_streak);
    assert!(streak.max_loss_streak >= streak.current_loss_streak);
    assert!(streak.current_win_streak == 0 || streak.current_loss_streak == 0);

    // Log capped at the 40 newest, newest first after pruning.
    let log = engine.verification_log();
    assert_eq!(log.len(), VERIFICATION_LOG_CAP);
    for pair in log.windows(2) {
        assert!(pair[0].recorded_at >= pair[1].recorded_at);
    }

    let accuracy = engine.log_accuracy();
    assert_eq!(accuracy.total, VERIFICATION_LOG_CAP);
    assert!((0.0..=1.0).contains(&accuracy.ratio));
}

// =============================================================================
// DEDUP AND RE-RUNS WITHOUT NEW DRAWS
// =============================================================================

#[test]
fn test_rerun_without_new_draw_is_idempotent() {
    let mut engine = PredictionEngine::new();
    let sim = FeedSimulator::new("alpha", 31, 100, 20);

    let first = engine.run_cycle(&[batch(&sim)]);
    assert!(first[0].committed_new);

    // Same history again: identical candidates, no second pending entry.
    let second = engine.run_cycle(&[batch(&sim)]);
    assert!(!second[0].committed_new);
    assert_eq!(first[0].candidates, second[0].candidates);
    assert_eq!(engine.pending("alpha").len(), 1);
    assert!(second[0].verifications.is_empty());
}

// =============================================================================
// MULTI-FEED ISOLATION
// =============================================================================

#[test]
fn test_feeds_are_isolated_except_for_the_shared_log() {
    let mut engine = PredictionEngine::new();
    let mut alpha = FeedSimulator::new("alpha", 5, 100, 20);
    let mut beta = FeedSimulator::new("beta", 6, 100, 20);

    for _ in 0..10 {
        engine.run_cycle(&[batch(&alpha), batch(&beta)]);
        alpha.advance();
        beta.advance();
    }

    let sa = engine.streak("alpha");
    let sb = engine.streak("beta");
    assert_eq!(sa.total_predictions, 9);
    assert_eq!(sb.total_predictions, 9);

    // Pending stores are per feed.
    assert!(engine.pending("alpha").iter().all(|p| p.feed == "alpha"));
    assert!(engine.pending("beta").iter().all(|p| p.feed == "beta"));

    // The log mixes both feeds.
    let log = engine.verification_log();
    assert!(log.iter().any(|r| r.feed == "alpha"));
    assert!(log.iter().any(|r| r.feed == "beta"));
    assert_eq!(log.len(), 18);

    // Summaries are independent too.
    assert_eq!(engine.summary("alpha").map(|s| s.feed.as_str()), Some("alpha"));
    assert_eq!(engine.summary("beta").map(|s| s.feed.as_str()), Some("beta"));
}

// =============================================================================
// DETERMINISM AND DISPLAY SURFACE
// =============================================================================

#[test]
fn test_identical_runs_produce_identical_outputs() {
    let run = || {
        let mut engine = PredictionEngine::new();
        let mut sim = FeedSimulator::new("alpha", 77, 100, 20);
        let mut outputs = Vec::new();
        for _ in 0..15 {
            let reports = engine.run_cycle(&[batch(&sim)]);
            outputs.push((
                reports[0].candidates.clone(),
                reports[0].summary.as_ref().map(|s| (s.period.clone(), s.descriptor, s.probability)),
                reports[0]
                    .verifications
                    .iter()
                    .map(|v| (v.period.clone(), v.correct))
                    .collect::<Vec<_>>(),
            ));
            sim.advance();
        }
        outputs
    };

    assert_eq!(run(), run());
}

#[test]
fn test_top5_surface_and_probability_bounds() {
    let mut engine = PredictionEngine::new();
    let sim = FeedSimulator::new("alpha", 99, 100, 50);

    let reports = engine.run_cycle(&[batch(&sim)]);
    let report = &reports[0];
    assert_eq!(report.candidates.len(), TOP_CANDIDATES);

    for pair in report.candidates.windows(2) {
        assert!(pair[0].probability >= pair[1].probability);
    }
    for c in &report.candidates {
        assert!((0.15..=0.85).contains(&c.probability));
    }

    let summary = report.summary.as_ref().expect("summary");
    assert_eq!(summary.probability, report.candidates[0].probability);
}

// =============================================================================
// SNAPSHOT CONTINUITY
// =============================================================================

#[test]
fn test_snapshot_restores_mid_run_state() {
    let mut sim = FeedSimulator::new("alpha", 13, 100, 20);
    let mut engine = PredictionEngine::new();
    for _ in 0..5 {
        engine.run_cycle(&[batch(&sim)]);
        sim.advance();
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    engine.export_snapshot().save_to(&path).expect("save");

    let restored_snapshot = EngineSnapshot::load_from(&path).expect("load");
    let mut restored = PredictionEngine::from_snapshot(restored_snapshot);

    // Both engines verify the same next draw identically.
    let reports_live = engine.run_cycle(&[batch(&sim)]);
    let reports_restored = restored.run_cycle(&[batch(&sim)]);

    assert_eq!(
        reports_live[0]
            .verifications
            .iter()
            .map(|v| (v.period.clone(), v.descriptor, v.correct))
            .collect::<Vec<_>>(),
        reports_restored[0]
            .verifications
            .iter()
            .map(|v| (v.period.clone(), v.descriptor, v.correct))
            .collect::<Vec<_>>(),
    );
    assert_eq!(engine.streak("alpha"), restored.streak("alpha"));
}

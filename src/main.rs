//! Draw predictor refresh loop.
//!
//! Every `REFRESH_INTERVAL_SECS` seconds each feed realizes a new draw, the
//! engine verifies outstanding predictions against it, streaks update, and
//! a fresh top-1 prediction is committed for the next period. Ctrl-C saves
//! the state snapshot (when SNAPSHOT_PATH is set) and exits.

use anyhow::Result;
use std::time::Duration;
use tracing::{info, info_span, warn};

use draw_predictor::config;
use draw_predictor::engine::{FeedReport, PredictionEngine};
use draw_predictor::logging;
use draw_predictor::metrics::Metrics;
use draw_predictor::simulator::FeedSimulator;
use draw_predictor::snapshot::EngineSnapshot;
use draw_predictor::types::{DrawRecord, FeedId};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before any config caching happens.
    dotenvy::dotenv().ok();

    let _log_guard = logging::init_logging();
    let run_id = logging::get_run_id();

    let metrics = Metrics::new();
    let feeds = config::feeds_from_env();
    let interval_secs = config::refresh_interval_secs();
    let history_len = config::draw_history_len();
    let snapshot_path = config::snapshot_path();

    let root_span = info_span!(
        "draw_predictor",
        run_id = %run_id,
        feeds = ?feeds,
        interval_secs = interval_secs,
    );
    let _enter = root_span.enter();

    info!("🎲 Draw Predictor starting");
    info!("   Feeds: {:?}", feeds);
    info!("   Refresh interval: {}s", interval_secs);
    info!("   History per feed: {} draws", history_len);

    let mut engine = match snapshot_path.as_deref().and_then(EngineSnapshot::load_from) {
        Some(snapshot) => PredictionEngine::from_snapshot(snapshot),
        None => PredictionEngine::new(),
    };

    // Deterministic per-feed seeds when SIM_SEED is set, otherwise random.
    let base_seed = config::sim_seed().unwrap_or_else(rand::random);
    let mut simulators: Vec<FeedSimulator> = feeds
        .iter()
        .enumerate()
        .map(|(i, feed)| {
            FeedSimulator::new(
                feed,
                base_seed.wrapping_add(i as u64),
                history_len,
                history_len,
            )
        })
        .collect();

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_one_cycle(&mut engine, &mut simulators, &metrics);
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutdown requested");
                break;
            }
        }
    }

    if let Some(path) = snapshot_path {
        engine.export_snapshot().save_to(&path)?;
    }
    info!("Goodbye ({})", metrics.format_summary());
    Ok(())
}

fn run_one_cycle(
    engine: &mut PredictionEngine,
    simulators: &mut [FeedSimulator],
    metrics: &Metrics,
) {
    let batches: Vec<(FeedId, Vec<DrawRecord>)> = simulators
        .iter_mut()
        .map(|sim| {
            sim.advance();
            (sim.feed().to_string(), sim.history().to_vec())
        })
        .collect();

    let reports = engine.run_cycle(&batches);
    for report in &reports {
        log_feed_report(report);
        metrics.feeds_processed.increment();
        if report.committed_new {
            metrics.predictions_committed.increment();
        }
        metrics
            .verifications_recorded
            .add(report.verifications.len() as u64);
        let wins = report.verifications.iter().filter(|v| v.correct).count() as u64;
        metrics.verification_wins.add(wins);
        metrics
            .verification_losses
            .add(report.verifications.len() as u64 - wins);
    }

    metrics.cycles_completed.increment();
    let open: usize = batches
        .iter()
        .map(|(feed, _)| engine.pending(feed).iter().filter(|p| !p.verified).count())
        .sum();
    metrics.pending_open.set(open as i64);
    metrics.log_len.set(engine.verification_log().len() as i64);

    let accuracy = engine.log_accuracy();
    info!(
        "💓 Heartbeat: log accuracy {}/{} ({:.1}%) | {}",
        accuracy.wins,
        accuracy.total,
        accuracy.ratio * 100.0,
        metrics.format_summary()
    );
}

fn log_feed_report(report: &FeedReport) {
    for v in &report.verifications {
        if v.correct {
            info!(
                "[{}] ✓ period {}: predicted {} (p={:.1}%), actual {}",
                report.feed,
                v.period,
                v.descriptor,
                v.probability * 100.0,
                v.actual
            );
        } else {
            info!(
                "[{}] ✗ period {}: predicted {} (p={:.1}%), actual {}",
                report.feed,
                v.period,
                v.descriptor,
                v.probability * 100.0,
                v.actual
            );
        }
    }

    match &report.summary {
        Some(summary) => {
            info!(
                "[{}] next {} -> {} (p={:.1}%, {}) streak W{}/L{} acc {:.1}%",
                report.feed,
                summary.period,
                summary.descriptor,
                summary.probability * 100.0,
                summary.tier,
                report.streak.current_win_streak,
                report.streak.current_loss_streak,
                report.streak.accuracy() * 100.0
            );
        }
        None => {
            info!("[{}] no qualifying position this cycle", report.feed);
        }
    }
}

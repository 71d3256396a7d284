//! Lightweight atomic counters and gauges for the refresh loop.
//!
//! Everything is in-process; the registry is snapshot-formatted into the
//! heartbeat log line each cycle.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing event counter.
#[derive(Debug)]
pub struct Counter {
    name: &'static str,
    value: AtomicU64,
}

impl Counter {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: AtomicU64::new(0),
        }
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Point-in-time value, settable from anywhere.
#[derive(Debug)]
pub struct Gauge {
    name: &'static str,
    value: AtomicI64,
}

impl Gauge {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: AtomicI64::new(0),
        }
    }

    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Metrics registry for the prediction loop.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Refresh cycles completed.
    pub cycles_completed: Arc<Counter>,
    /// Feeds processed across all cycles.
    pub feeds_processed: Arc<Counter>,
    /// New pending predictions committed (dedup hits excluded).
    pub predictions_committed: Arc<Counter>,
    /// Verification records emitted.
    pub verifications_recorded: Arc<Counter>,
    /// Verifications that hit.
    pub verification_wins: Arc<Counter>,
    /// Verifications that missed.
    pub verification_losses: Arc<Counter>,

    /// Pending predictions currently open across all feeds.
    pub pending_open: Arc<Gauge>,
    /// Current verification log length.
    pub log_len: Arc<Gauge>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            cycles_completed: Arc::new(Counter::new("cycles_completed")),
            feeds_processed: Arc::new(Counter::new("feeds_processed")),
            predictions_committed: Arc::new(Counter::new("predictions_committed")),
            verifications_recorded: Arc::new(Counter::new("verifications_recorded")),
            verification_wins: Arc::new(Counter::new("verification_wins")),
            verification_losses: Arc::new(Counter::new("verification_losses")),
            pending_open: Arc::new(Gauge::new("pending_open")),
            log_len: Arc::new(Gauge::new("log_len")),
        }
    }

    /// One-line summary for the heartbeat log.
    pub fn format_summary(&self) -> String {
        format!(
            "cycles={} feeds={} committed={} verified={} ({}W/{}L) pending={} log={}",
            self.cycles_completed.get(),
            self.feeds_processed.get(),
            self.predictions_committed.get(),
            self.verifications_recorded.get(),
            self.verification_wins.get(),
            self.verification_losses.get(),
            self.pending_open.get(),
            self.log_len.get(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

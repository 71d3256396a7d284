//! The prediction/verification engine.
//!
//! One `PredictionEngine` owns all per-feed state: the pending prediction
//! store, streak counters, latest top-1 summaries and the single cross-feed
//! verification log. Per feed and cycle the order is fixed: verify pending
//! predictions against the newest draw, update streaks, then build and
//! commit a fresh prediction from the full history. End-of-cycle pruning
//! ages out stale pending entries and caps the log.
//!
//! The engine never performs I/O and no operation here can fail; thin
//! inputs degrade to empty reports.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::analyzer;
use crate::config::{
    MIN_HISTORY_ROWS, MIN_POSITION_SAMPLES, PENDING_RETENTION_DAYS, POSITIONS, TOP_CANDIDATES,
    VERIFICATION_LOG_CAP,
};
use crate::period;
use crate::snapshot::EngineSnapshot;
use crate::streaks::StreakState;
use crate::types::{
    Descriptor, DrawRecord, FeedId, Label, PendingPrediction, PredictionCandidate,
    RecommendationTier, Top1Summary, VerificationRecord,
};

/// Everything the engine produced for one feed in one cycle.
#[derive(Debug, Clone)]
pub struct FeedReport {
    pub feed: FeedId,
    /// Top-5 ranked candidates, for display. Empty when no position qualified.
    pub candidates: Vec<PredictionCandidate>,
    /// The committed top-1 summary, absent when nothing qualified this cycle.
    pub summary: Option<Top1Summary>,
    /// Whether the top-1 was newly committed (false on dedup hit or no summary).
    pub committed_new: bool,
    /// Verification records emitted against the newest draw.
    pub verifications: Vec<VerificationRecord>,
    /// Streak counters after this cycle's verifications.
    pub streak: StreakState,
}

/// Wins over the current verification log, across all feeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogAccuracy {
    pub wins: usize,
    pub total: usize,
    pub ratio: f64,
}

#[derive(Debug, Default)]
pub struct PredictionEngine {
    /// Not-yet-aged-out predictions, per feed.
    pending: HashMap<FeedId, Vec<PendingPrediction>>,
    streaks: HashMap<FeedId, StreakState>,
    summaries: HashMap<FeedId, Top1Summary>,
    /// Cross-feed verification history, capped at 40 newest.
    log: Vec<VerificationRecord>,
}

impl PredictionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from a previously exported snapshot. Summaries are
    /// derived state and start empty.
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Self {
        Self {
            pending: snapshot.pending,
            streaks: snapshot.streaks,
            summaries: HashMap::new(),
            log: snapshot.log,
        }
    }

    /// Export all durable state for persistence.
    pub fn export_snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            captured_at: Utc::now(),
            pending: self.pending.clone(),
            streaks: self.streaks.clone(),
            log: self.log.clone(),
        }
    }

    /// Run one full cycle over materialized histories (each ordered oldest
    /// to newest), one entry per feed, then prune.
    pub fn run_cycle(&mut self, batches: &[(FeedId, Vec<DrawRecord>)]) -> Vec<FeedReport> {
        let now = Utc::now();
        let reports = batches
            .iter()
            .map(|(feed, history)| self.process_feed_at(feed, history, now))
            .collect();
        self.finish_cycle_at(now);
        reports
    }

    /// Verify, update streaks and build a new prediction for one feed.
    pub fn process_feed(&mut self, feed: &str, history: &[DrawRecord]) -> FeedReport {
        self.process_feed_at(feed, history, Utc::now())
    }

    pub fn process_feed_at(
        &mut self,
        feed: &str,
        history: &[DrawRecord],
        now: DateTime<Utc>,
    ) -> FeedReport {
        let verifications = self.verify_feed(feed, history.last(), now);

        let mut report = FeedReport {
            feed: feed.to_string(),
            candidates: Vec::new(),
            summary: None,
            committed_new: false,
            verifications,
            streak: self.streak(feed),
        };

        if history.len() < MIN_HISTORY_ROWS {
            return report;
        }
        // history is non-empty past the row check
        let Some(latest) = history.last() else {
            return report;
        };

        let mut ranked = rank_candidates(feed, history);
        if ranked.is_empty() {
            // No qualifying position this cycle: drop any stale summary.
            self.summaries.remove(feed);
            return report;
        }
        ranked.truncate(TOP_CANDIDATES);

        let next = period::next_period(&latest.period);
        let top1 = &ranked[0];
        report.committed_new = self.commit_pending(feed, &next, top1, now);

        let summary = Top1Summary {
            feed: feed.to_string(),
            period: next,
            descriptor: top1.descriptor,
            probability: top1.probability,
            tier: RecommendationTier::for_probability(top1.probability),
            updated_at: now,
        };
        self.summaries.insert(feed.to_string(), summary.clone());

        report.candidates = ranked;
        report.summary = Some(summary);
        report
    }

    /// Age out pending predictions past retention and cap the log. Called by
    /// `run_cycle`; callers driving `process_feed` directly call this once
    /// per cycle themselves.
    pub fn finish_cycle(&mut self) {
        self.finish_cycle_at(Utc::now());
    }

    pub fn finish_cycle_at(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(PENDING_RETENTION_DAYS);
        for entries in self.pending.values_mut() {
            entries.retain(|p| p.created_at >= cutoff);
        }
        self.pending.retain(|_, entries| !entries.is_empty());

        if self.log.len() > VERIFICATION_LOG_CAP {
            self.log
                .sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
            self.log.truncate(VERIFICATION_LOG_CAP);
        }
    }

    /// Check all unverified pending predictions targeting the newest draw's
    /// period. Matching entries get a verification record and the verified
    /// flag; an entry whose position has no realized digit is unverifiable
    /// and dropped on the spot (its period will never come around again).
    fn verify_feed(
        &mut self,
        feed: &str,
        newest: Option<&DrawRecord>,
        now: DateTime<Utc>,
    ) -> Vec<VerificationRecord> {
        let Some(newest) = newest else {
            return Vec::new();
        };
        let Some(entries) = self.pending.get_mut(feed) else {
            return Vec::new();
        };

        let streak = self.streaks.entry(feed.to_string()).or_default();
        let mut emitted = Vec::new();

        entries.retain_mut(|p| {
            if p.verified || p.target_period != newest.period {
                return true;
            }

            let Some(digit) = newest.digit(p.descriptor.position) else {
                debug!(
                    feed = %feed,
                    descriptor = %p.descriptor,
                    period = %p.target_period,
                    "dropping unverifiable pending prediction (no realized digit)"
                );
                return false;
            };

            let actual = Label::of(p.descriptor.label.axis(), digit);
            let correct = p.descriptor.label == actual;
            p.verified = true;
            streak.record_outcome(correct);

            emitted.push(VerificationRecord {
                feed: feed.to_string(),
                period: newest.period.clone(),
                descriptor: p.descriptor,
                probability: p.probability,
                actual,
                correct,
                recorded_at: now,
            });
            true
        });

        self.log.extend(emitted.iter().cloned());
        emitted
    }

    /// Insert a pending prediction unless an identical (feed, target period,
    /// descriptor) entry already exists. Returns whether it was inserted.
    fn commit_pending(
        &mut self,
        feed: &str,
        target_period: &str,
        top1: &PredictionCandidate,
        now: DateTime<Utc>,
    ) -> bool {
        let entries = self.pending.entry(feed.to_string()).or_default();
        let duplicate = entries
            .iter()
            .any(|p| p.target_period == target_period && p.descriptor == top1.descriptor);
        if duplicate {
            return false;
        }

        entries.push(PendingPrediction {
            feed: feed.to_string(),
            target_period: target_period.to_string(),
            descriptor: top1.descriptor,
            probability: top1.probability,
            created_at: now,
            verified: false,
        });
        true
    }

    pub fn streak(&self, feed: &str) -> StreakState {
        self.streaks.get(feed).copied().unwrap_or_default()
    }

    pub fn pending(&self, feed: &str) -> &[PendingPrediction] {
        self.pending.get(feed).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self, feed: &str) -> Option<&Top1Summary> {
        self.summaries.get(feed)
    }

    pub fn verification_log(&self) -> &[VerificationRecord] {
        &self.log
    }

    /// Hit rate over the current (capped) verification log.
    pub fn log_accuracy(&self) -> LogAccuracy {
        let total = self.log.len();
        let wins = self.log.iter().filter(|r| r.correct).count();
        let ratio = if total == 0 {
            0.0
        } else {
            wins as f64 / total as f64
        };
        LogAccuracy { wins, total, ratio }
    }
}

/// Build and rank all candidates for a feed over its full history: four per
/// qualifying position (big, small, odd, even), sorted by probability
/// descending, then position ascending, then fixed label order.
fn rank_candidates(feed: &str, history: &[DrawRecord]) -> Vec<PredictionCandidate> {
    let mut all = Vec::new();

    for position in 1..=POSITIONS {
        let column: Vec<Option<u8>> = history.iter().map(|r| r.digit(position)).collect();
        let usable = column.iter().flatten().count();
        if usable < MIN_POSITION_SAMPLES {
            continue;
        }

        let big_small = analyzer::fused_big_small(&column);
        let odd_even = analyzer::odd_even(&column);

        for (label, probability) in [
            (Label::Big, big_small.primary),
            (Label::Small, big_small.complement),
            (Label::Odd, odd_even.primary),
            (Label::Even, odd_even.complement),
        ] {
            all.push(PredictionCandidate {
                feed: feed.to_string(),
                descriptor: Descriptor { position, label },
                probability,
            });
        }
    }

    all.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| a.descriptor.position.cmp(&b.descriptor.position))
            .then_with(|| a.descriptor.label.rank().cmp(&b.descriptor.label.rank()))
    });
    all
}

//! Simulated draw feeds.
//!
//! Real deployments would materialize draw histories from upstream HTTP
//! feeds; that transport lives outside this crate. The simulator stands in
//! at the same boundary: it keeps an ordered (oldest to newest) history per
//! feed, advances the period through the same sequencer as the engine, and
//! fills each draw with uniform random digits. Seed it for reproducible runs.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MIN_HISTORY_ROWS;
use crate::period;
use crate::types::DrawRecord;

/// One simulated feed with a bounded rolling history.
#[derive(Debug)]
pub struct FeedSimulator {
    feed: String,
    history: Vec<DrawRecord>,
    rng: StdRng,
    history_cap: usize,
}

impl FeedSimulator {
    /// New feed starting at today's `-0001` period with `backfill` draws
    /// already realized.
    pub fn new(feed: &str, seed: u64, history_cap: usize, backfill: usize) -> Self {
        let mut sim = Self {
            feed: feed.to_string(),
            history: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            history_cap: history_cap.max(MIN_HISTORY_ROWS),
        };
        for _ in 0..backfill {
            sim.advance();
        }
        sim
    }

    pub fn feed(&self) -> &str {
        &self.feed
    }

    /// Ordered oldest to newest.
    pub fn history(&self) -> &[DrawRecord] {
        &self.history
    }

    /// Realize the next draw and return it.
    pub fn advance(&mut self) -> &DrawRecord {
        let next_period = match self.history.last() {
            Some(last) => period::next_period(&last.period),
            None => format!("{}-0001", Utc::now().format("%Y%m%d")),
        };

        let mut digits = [None; 5];
        for slot in digits.iter_mut() {
            *slot = Some(self.rng.gen_range(0..10) as u8);
        }

        self.history.push(DrawRecord::new(next_period, digits));
        if self.history.len() > self.history_cap {
            let excess = self.history.len() - self.history_cap;
            self.history.drain(..excess);
        }
        self.history.last().expect("just pushed")
    }
}

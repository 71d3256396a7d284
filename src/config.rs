//! Tuning constants and environment variable parsing.
//!
//! The analysis constants are empirical values carried over from the system
//! this predictor tracks against. The test suite depends on their exact
//! values; change them only together with the tests.

/// Exponential recency decay applied per draw when weighting a column.
pub const DECAY_FACTOR: f64 = 0.95;

/// Digits at or above this count as "big".
pub const BIG_THRESHOLD: u8 = 5;

/// How many of the most recent observations the trend detector inspects.
pub const TREND_WINDOW: usize = 5;

/// Minimum trailing run length before the anti-momentum correction kicks in.
pub const TREND_RUN_THRESHOLD: usize = 3;

/// Correction per run step beyond the threshold (applied negatively).
pub const TREND_CORRECTION_STEP: f64 = 0.08;

/// How many of the most recent observations the continuity check inspects.
pub const CONTINUITY_WINDOW: usize = 3;

/// Flat adjustment when a unanimous recent run contradicts a confident estimate.
pub const CONTINUITY_ADJUST: f64 = 0.15;

/// Big-probability above this is "confident big" for the continuity check.
pub const CONTINUITY_HIGH: f64 = 0.6;

/// Big-probability below this is "confident small" for the continuity check.
pub const CONTINUITY_LOW: f64 = 0.4;

/// Hard bounds on any non-neutral probability.
pub const PROB_FLOOR: f64 = 0.15;
pub const PROB_CEILING: f64 = 0.85;

/// Multi-window fusion: window sizes (most recent N observations) ...
pub const SHORT_WINDOW: usize = 10;
pub const MEDIUM_WINDOW: usize = 30;
pub const LONG_WINDOW: usize = 50;

/// ... and their fusion weights (short-term dominates).
pub const FUSION_SHORT_WEIGHT: f64 = 0.5;
pub const FUSION_MEDIUM_WEIGHT: f64 = 0.3;
pub const FUSION_LONG_WEIGHT: f64 = 0.2;

/// A position needs at least this many parseable samples to be ranked.
pub const MIN_POSITION_SAMPLES: usize = 10;

/// A feed needs at least this many draws before predictions are built.
pub const MIN_HISTORY_ROWS: usize = 2;

/// Digit positions per draw.
pub const POSITIONS: u8 = 5;

/// Ranked candidates surfaced per feed per cycle.
pub const TOP_CANDIDATES: usize = 5;

/// Highest sequence number within one calendar day for date-form periods.
pub const MAX_SEQUENCE_PER_DAY: u32 = 1440;

/// Pending predictions older than this are dropped, verified or not.
pub const PENDING_RETENTION_DAYS: i64 = 7;

/// The cross-feed verification log keeps only this many newest records.
pub const VERIFICATION_LOG_CAP: usize = 40;

/// Recommendation tier cutoffs, highest first.
pub const TIER_STRONG: f64 = 0.75;
pub const TIER_RECOMMENDED: f64 = 0.65;
pub const TIER_NEUTRAL: f64 = 0.55;
pub const TIER_CAUTION: f64 = 0.45;

/// Feeds simulated when the FEEDS env var is unset.
pub const DEFAULT_FEEDS: &[&str] = &["hanoi-1min", "lucky-ff", "speed-ssc", "tencent-ff"];

/// Seconds between refresh cycles (REFRESH_INTERVAL_SECS, default 5).
pub fn refresh_interval_secs() -> u64 {
    use std::sync::OnceLock;

    static CACHED: OnceLock<u64> = OnceLock::new();
    *CACHED.get_or_init(|| {
        std::env::var("REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&v| v > 0)
            .unwrap_or(5)
    })
}

/// Feeds to track, from FEEDS (comma-separated). Unset/empty means the
/// default four.
pub fn feeds_from_env() -> Vec<String> {
    std::env::var("FEEDS")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.split(',').map(|f| f.trim().to_string()).collect())
        .unwrap_or_else(|| DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect())
}

/// Optional snapshot file. When set, state is loaded at startup and saved
/// on shutdown.
pub fn snapshot_path() -> Option<String> {
    std::env::var("SNAPSHOT_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Rows of history retained per simulated feed (DRAW_HISTORY_LEN, default 50).
pub fn draw_history_len() -> usize {
    use std::sync::OnceLock;

    static CACHED: OnceLock<usize> = OnceLock::new();
    *CACHED.get_or_init(|| {
        std::env::var("DRAW_HISTORY_LEN")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&v| v >= MIN_HISTORY_ROWS)
            .unwrap_or(50)
    })
}

/// Base RNG seed for the simulator (SIM_SEED). Unset means a random run.
pub fn sim_seed() -> Option<u64> {
    std::env::var("SIM_SEED").ok().and_then(|s| s.parse().ok())
}

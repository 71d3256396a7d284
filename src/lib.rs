//! Multi-feed lottery draw tracker with closed-loop prediction.
//!
//! Ingests ordered draw histories from several numeric lottery feeds,
//! estimates per-position big/small and odd/even probabilities with
//! recency weighting and anti-momentum corrections, commits a top-1
//! prediction for each feed's next period, and verifies predictions
//! against the draws that actually arrive, tracking streaks and accuracy.

pub mod analyzer;
pub mod config;
pub mod engine;
pub mod logging;
pub mod metrics;
pub mod period;
pub mod simulator;
pub mod snapshot;
pub mod streaks;
pub mod types;

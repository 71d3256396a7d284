//! Probability estimation over one positional digit column.
//!
//! The pipeline for a column (ordered oldest to newest):
//! recency-weighted base frequency, anti-momentum trend correction,
//! continuity correction (big/small axis only) and a hard clamp. Big/small
//! additionally fuses the pipeline over 10/30/50-observation windows.
//!
//! Nothing here can fail: absent digits are skipped during weighting and a
//! column with no usable samples yields the neutral 50/50 pair.

use crate::config::{
    CONTINUITY_ADJUST, CONTINUITY_HIGH, CONTINUITY_LOW, CONTINUITY_WINDOW, DECAY_FACTOR,
    FUSION_LONG_WEIGHT, FUSION_MEDIUM_WEIGHT, FUSION_SHORT_WEIGHT, LONG_WINDOW, MEDIUM_WINDOW,
    PROB_CEILING, PROB_FLOOR, SHORT_WINDOW, TREND_CORRECTION_STEP, TREND_RUN_THRESHOLD,
    TREND_WINDOW,
};
use crate::types::Axis;

/// A complementary probability pair for one axis. `primary` is the
/// probability of the axis predicate holding (Big, or Odd); `complement`
/// is always exactly `1.0 - primary`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbPair {
    pub primary: f64,
    pub complement: f64,
}

impl ProbPair {
    /// The 50/50 default for empty or unusable input.
    pub fn neutral() -> Self {
        Self {
            primary: 0.5,
            complement: 0.5,
        }
    }

    fn from_primary(primary: f64) -> Self {
        Self {
            primary,
            complement: 1.0 - primary,
        }
    }
}

fn clamp(p: f64) -> f64 {
    p.max(PROB_FLOOR).min(PROB_CEILING)
}

/// Recency-weighted empirical frequency of the axis predicate. The i-th
/// observation (0-indexed, last = newest) carries weight `0.95^(n-1-i)`;
/// absent digits contribute nothing but keep their slot in the exponent.
/// `None` when no usable sample exists.
fn weighted_base(digits: &[Option<u8>], axis: Axis) -> Option<f64> {
    let n = digits.len();
    let mut hit = 0.0;
    let mut total = 0.0;

    for (i, digit) in digits.iter().enumerate() {
        if let Some(d) = digit {
            let weight = DECAY_FACTOR.powi((n - 1 - i) as i32);
            total += weight;
            if axis.holds(*d) {
                hit += weight;
            }
        }
    }

    if total == 0.0 {
        None
    } else {
        Some(hit / total)
    }
}

/// Anti-momentum correction: a trailing run of 3+ identical outcomes within
/// the last 5 observations dampens the probability of that run continuing,
/// by 0.08 per run step beyond 2. Needs at least 5 observations.
fn trend_correction(digits: &[Option<u8>], axis: Axis, base: f64) -> f64 {
    if digits.len() < TREND_WINDOW {
        return base;
    }

    let recent = &digits[digits.len() - TREND_WINDOW..];
    let mut run = 0usize;
    let mut outcome = false;
    for d in recent.iter().rev().filter_map(|d| *d) {
        let current = axis.holds(d);
        if run == 0 {
            outcome = current;
            run = 1;
        } else if current == outcome {
            run += 1;
        } else {
            break;
        }
    }

    if run < TREND_RUN_THRESHOLD {
        return base;
    }

    let correction = -TREND_CORRECTION_STEP * (run as f64 - 2.0);
    if outcome {
        (base + correction).max(PROB_FLOOR)
    } else {
        (base - correction).min(PROB_CEILING)
    }
}

/// Continuity correction (big/small only): three unanimous recent digits
/// against a confident same-direction estimate pull the estimate back by
/// 0.15. Needs at least 3 observations, all three parseable.
fn continuity_correction(digits: &[Option<u8>], prob: f64) -> f64 {
    if digits.len() < CONTINUITY_WINDOW {
        return prob;
    }

    let recent = &digits[digits.len() - CONTINUITY_WINDOW..];
    let Some(values) = recent.iter().copied().collect::<Option<Vec<u8>>>() else {
        return prob;
    };

    let all_big = values.iter().all(|&d| Axis::BigSmall.holds(d));
    let all_small = values.iter().all(|&d| !Axis::BigSmall.holds(d));

    if all_big && prob > CONTINUITY_HIGH {
        prob - CONTINUITY_ADJUST
    } else if all_small && prob < CONTINUITY_LOW {
        prob + CONTINUITY_ADJUST
    } else {
        prob
    }
}

/// Weighted + trend-corrected probability pair for one axis. This is the
/// full pipeline for odd/even, and the per-window pipeline for big/small.
pub fn weighted_probability(digits: &[Option<u8>], axis: Axis) -> ProbPair {
    let Some(base) = weighted_base(digits, axis) else {
        return ProbPair::neutral();
    };
    let corrected = trend_correction(digits, axis, base);
    ProbPair::from_primary(clamp(corrected))
}

/// Big/small probability fused over short/medium/long windows
/// (0.5 / 0.3 / 0.2), then continuity-corrected and clamped.
/// Fewer than 10 observations yields the neutral pair.
pub fn fused_big_small(digits: &[Option<u8>]) -> ProbPair {
    if digits.len() < SHORT_WINDOW {
        return ProbPair::neutral();
    }

    let tail = |window: usize| &digits[digits.len().saturating_sub(window)..];
    let short = weighted_probability(tail(SHORT_WINDOW), Axis::BigSmall).primary;
    let medium = weighted_probability(tail(MEDIUM_WINDOW), Axis::BigSmall).primary;
    let long = weighted_probability(tail(LONG_WINDOW), Axis::BigSmall).primary;

    let fused =
        short * FUSION_SHORT_WEIGHT + medium * FUSION_MEDIUM_WEIGHT + long * FUSION_LONG_WEIGHT;
    ProbPair::from_primary(clamp(continuity_correction(digits, fused)))
}

/// Odd/even probability: the weighted + trend pipeline, no window fusion.
pub fn odd_even(digits: &[Option<u8>]) -> ProbPair {
    weighted_probability(digits, Axis::OddEven)
}

/// Raw digit frequency counts (0..=9) over a column.
pub fn digit_frequencies(digits: &[Option<u8>]) -> [u32; 10] {
    let mut freq = [0u32; 10];
    for d in digits.iter().flatten() {
        if *d <= 9 {
            freq[*d as usize] += 1;
        }
    }
    freq
}

/// Empirical per-digit probabilities over a column; all zeros when the
/// column has no usable sample.
pub fn digit_probabilities(digits: &[Option<u8>]) -> [f64; 10] {
    let freq = digit_frequencies(digits);
    let total: u32 = freq.iter().sum();
    let mut probs = [0.0f64; 10];
    if total == 0 {
        return probs;
    }
    for (p, f) in probs.iter_mut().zip(freq.iter()) {
        *p = *f as f64 / total as f64;
    }
    probs
}

/// Fraction of the last 10 entries satisfying the predicate, or `None` when
/// fewer than 10 of them are usable.
pub fn recent_trend(digits: &[Option<u8>], predicate: impl Fn(u8) -> bool) -> Option<f64> {
    if digits.len() < SHORT_WINDOW {
        return None;
    }
    let recent: Vec<u8> = digits[digits.len() - SHORT_WINDOW..]
        .iter()
        .flatten()
        .copied()
        .collect();
    if recent.len() < SHORT_WINDOW {
        return None;
    }
    let hits = recent.iter().filter(|&&d| predicate(d)).count();
    Some(hits as f64 / SHORT_WINDOW as f64)
}

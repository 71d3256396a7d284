//! Core data model: draw records, prediction descriptors, verification
//! records and the derived per-feed summary.
//!
//! Everything that can be snapshotted to disk derives serde; timestamps are
//! always `DateTime<Utc>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{BIG_THRESHOLD, TIER_CAUTION, TIER_NEUTRAL, TIER_RECOMMENDED, TIER_STRONG};

/// One draw source, tracked independently.
pub type FeedId = String;

/// A single draw result: the period identifier plus the five positional
/// digits. A position that failed to parse upstream is carried as `None`
/// and simply skipped during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub period: String,
    pub digits: [Option<u8>; 5],
}

impl DrawRecord {
    pub fn new(period: impl Into<String>, digits: [Option<u8>; 5]) -> Self {
        Self {
            period: period.into(),
            digits,
        }
    }

    /// Digit at a 1-based position (1..=5). Out-of-range positions yield `None`.
    pub fn digit(&self, position: u8) -> Option<u8> {
        match position {
            1..=5 => self.digits[(position - 1) as usize],
            _ => None,
        }
    }
}

/// Classification axis for a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    BigSmall,
    OddEven,
}

impl Axis {
    /// Whether the axis predicate holds: Big (digit >= 5) or Odd (parity).
    pub fn holds(self, digit: u8) -> bool {
        match self {
            Axis::BigSmall => digit >= BIG_THRESHOLD,
            Axis::OddEven => digit % 2 == 1,
        }
    }
}

/// One of the four predictable outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Big,
    Small,
    Odd,
    Even,
}

impl Label {
    pub fn axis(self) -> Axis {
        match self {
            Label::Big | Label::Small => Axis::BigSmall,
            Label::Odd | Label::Even => Axis::OddEven,
        }
    }

    /// The label a realized digit falls under on the given axis.
    pub fn of(axis: Axis, digit: u8) -> Self {
        match (axis, axis.holds(digit)) {
            (Axis::BigSmall, true) => Label::Big,
            (Axis::BigSmall, false) => Label::Small,
            (Axis::OddEven, true) => Label::Odd,
            (Axis::OddEven, false) => Label::Even,
        }
    }

    /// Fixed enumeration order used as the final ranking tiebreak.
    pub fn rank(self) -> u8 {
        match self {
            Label::Big => 0,
            Label::Small => 1,
            Label::Odd => 2,
            Label::Even => 3,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Big => "big",
            Label::Small => "small",
            Label::Odd => "odd",
            Label::Even => "even",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Label {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" => Ok(Label::Big),
            "small" => Ok(Label::Small),
            "odd" => Ok(Label::Odd),
            "even" => Ok(Label::Even),
            _ => Err(()),
        }
    }
}

/// What was predicted: a position and the outcome label for it,
/// e.g. "P1-big". The textual form is used in logs and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    /// 1-based digit position (1..=5).
    pub position: u8,
    pub label: Label,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}-{}", self.position, self.label)
    }
}

impl FromStr for Descriptor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pos_part, label_part) = s.split_once('-').ok_or(())?;
        let position: u8 = pos_part
            .strip_prefix('P')
            .ok_or(())?
            .parse()
            .map_err(|_| ())?;
        if !(1..=5).contains(&position) {
            return Err(());
        }
        let label = label_part.parse()?;
        Ok(Descriptor { position, label })
    }
}

/// A ranked candidate for the next draw. Regenerated every cycle,
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionCandidate {
    pub feed: FeedId,
    pub descriptor: Descriptor,
    pub probability: f64,
}

/// A committed top-1 prediction awaiting its target period.
///
/// Unique per (feed, target period, descriptor). Verification sets the flag
/// instead of deleting the entry; age-based pruning removes it either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPrediction {
    pub feed: FeedId,
    pub target_period: String,
    pub descriptor: Descriptor,
    pub probability: f64,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
}

/// Outcome of checking one pending prediction against a realized draw.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub feed: FeedId,
    pub period: String,
    pub descriptor: Descriptor,
    pub probability: f64,
    pub actual: Label,
    pub correct: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Discretized confidence label for a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationTier {
    Strong,
    Recommended,
    Neutral,
    Caution,
    Avoid,
}

impl RecommendationTier {
    pub fn for_probability(probability: f64) -> Self {
        if probability >= TIER_STRONG {
            RecommendationTier::Strong
        } else if probability >= TIER_RECOMMENDED {
            RecommendationTier::Recommended
        } else if probability >= TIER_NEUTRAL {
            RecommendationTier::Neutral
        } else if probability >= TIER_CAUTION {
            RecommendationTier::Caution
        } else {
            RecommendationTier::Avoid
        }
    }
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationTier::Strong => "strong",
            RecommendationTier::Recommended => "recommended",
            RecommendationTier::Neutral => "neutral",
            RecommendationTier::Caution => "caution",
            RecommendationTier::Avoid => "avoid",
        };
        write!(f, "{}", s)
    }
}

/// Latest committed top-1 prediction per feed. Derived state, overwritten
/// every cycle the feed qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Top1Summary {
    pub feed: FeedId,
    pub period: String,
    pub descriptor: Descriptor,
    pub probability: f64,
    pub tier: RecommendationTier,
    pub updated_at: DateTime<Utc>,
}

//! Next-period identifier arithmetic.
//!
//! Two well-formed shapes are recognized: `"<yyyymmdd>-<seq>"` with a
//! zero-padded sequence that rolls over to the next calendar day at 1440,
//! and a plain integer. Anything else degrades without failing.

use chrono::{Duration, NaiveDate};

use crate::config::MAX_SEQUENCE_PER_DAY;

/// Placeholder emitted for an empty current period.
pub const UNKNOWN_PERIOD: &str = "unknown";

/// Next period identifier for a feed.
///
/// - `"20250724-0964"` -> `"20250724-0965"` (width preserved)
/// - `"20250724-1440"` -> `"20250725-0001"` (day rollover)
/// - `"12345"` -> `"12346"`
/// - `""` -> `"unknown"`
/// - anything else -> the input with `"+1"` appended
pub fn next_period(current: &str) -> String {
    if current.is_empty() {
        return UNKNOWN_PERIOD.to_string();
    }

    if let Some(next) = next_date_sequence(current) {
        return next;
    }

    if let Ok(n) = current.parse::<u64>() {
        return (n + 1).to_string();
    }

    format!("{}+1", current)
}

fn next_date_sequence(current: &str) -> Option<String> {
    let (date_part, seq_part) = current.split_once('-')?;
    if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
    let seq: u32 = seq_part.parse().ok()?;
    let width = seq_part.len();

    if seq >= MAX_SEQUENCE_PER_DAY {
        let next_day = date + Duration::days(1);
        Some(format!(
            "{}-{:0width$}",
            next_day.format("%Y%m%d"),
            1,
            width = width
        ))
    } else {
        Some(format!("{}-{:0width$}", date_part, seq + 1, width = width))
    }
}

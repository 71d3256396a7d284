//! Per-feed win/loss streak and accuracy bookkeeping.

use serde::{Deserialize, Serialize};

/// Running counters for one feed. Totals and maxima only grow; the two
/// current streaks are mutually exclusive and reset on the opposite outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub total_predictions: u32,
    pub total_wins: u32,
    pub current_win_streak: u32,
    pub current_loss_streak: u32,
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
}

impl StreakState {
    /// Fold one verification outcome into the counters.
    pub fn record_outcome(&mut self, correct: bool) {
        self.total_predictions += 1;

        if correct {
            self.total_wins += 1;
            self.current_win_streak += 1;
            self.current_loss_streak = 0;
            if self.current_win_streak > self.max_win_streak {
                self.max_win_streak = self.current_win_streak;
            }
        } else {
            self.current_loss_streak += 1;
            self.current_win_streak = 0;
            if self.current_loss_streak > self.max_loss_streak {
                self.max_loss_streak = self.current_loss_streak;
            }
        }
    }

    /// Hit rate over the feed's lifetime; 0.0 before any verification.
    pub fn accuracy(&self) -> f64 {
        if self.total_predictions == 0 {
            0.0
        } else {
            self.total_wins as f64 / self.total_predictions as f64
        }
    }
}

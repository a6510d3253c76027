//! Running streak bookkeeping.
//!
//! Meditation and fasting each keep a [`StreakState`] that is updated once per
//! completed session, so the current streak is available without rescanning
//! history. The rescanning variants live in [`crate::stats`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::is_next_day;

/// Consecutive-day counters for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StreakState {
    /// Calendar day of the most recent completed session.
    pub last_session_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl StreakState {
    /// Fold a session completed on `day` into the counters.
    ///
    /// Same day: unchanged. Next day: +1. Anything else (including a day
    /// earlier than the last one): restart at 1.
    pub fn record(&mut self, day: NaiveDate) {
        self.current_streak = match self.last_session_date {
            None => 1,
            Some(last) if last == day => self.current_streak,
            Some(last) if is_next_day(last, day) => self.current_streak + 1,
            Some(_) => 1,
        };
        self.last_session_date = Some(day);
        self.best_streak = self.best_streak.max(self.current_streak);
    }
}

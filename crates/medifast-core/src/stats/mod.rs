//! Statistics engine.
//!
//! Pure functions over history lists: longest, averages, day streaks, weekly
//! grouping and duration filters. Meditation sessions and fasts both implement
//! [`TimedRecord`], so every activity shares the same arithmetic. Nothing in
//! here mutates its input.

mod aggregate;
mod streaks;
mod summary;
mod weekly;

pub use aggregate::{average, filter_by_min_duration, longest, total_duration};
pub use streaks::{best_streak, current_streak, distinct_days};
pub use summary::ActivityStats;
pub use weekly::{group_by_calendar_week, HistoryFilter, WeekBucket};

use chrono::{DateTime, Utc};

/// A dated record with an optional duration.
pub trait TimedRecord {
    fn started_at(&self) -> DateTime<Utc>;

    /// `None` while the record is still open.
    fn ended_at(&self) -> Option<DateTime<Utc>>;

    fn duration_secs(&self) -> Option<i64>;

    /// End date when present, start date otherwise.
    fn reference_date(&self) -> DateTime<Utc> {
        self.ended_at().unwrap_or_else(|| self.started_at())
    }
}

//! Wall-clock and calendar abstractions.
//!
//! Engines never call `Utc::now()` directly: "now" comes from an injected
//! [`Clock`], and calendar-day questions (streaks, weekly grouping) go through
//! a [`Calendar`] so the same code runs against the host's local zone in
//! production and a fixed offset in tests.

use std::cell::Cell;

use chrono::{DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// First day of a calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Local,
    Fixed(FixedOffset),
}

/// Maps instants onto calendar days and weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    zone: Zone,
    week_start: WeekStart,
}

impl Calendar {
    /// The host's local time zone, DST included.
    pub fn local() -> Self {
        Self {
            zone: Zone::Local,
            week_start: WeekStart::Monday,
        }
    }

    pub fn utc() -> Self {
        Self::fixed(Utc.fix())
    }

    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            zone: Zone::Fixed(offset),
            week_start: WeekStart::Monday,
        }
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Calendar day containing `at`.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self.zone {
            Zone::Local => at.with_timezone(&Local).date_naive(),
            Zone::Fixed(offset) => at.with_timezone(&offset).date_naive(),
        }
    }

    /// First day of the week containing `at`.
    pub fn week_of(&self, at: DateTime<Utc>) -> NaiveDate {
        let day = self.day_of(at);
        let back = match self.week_start {
            WeekStart::Monday => day.weekday().num_days_from_monday(),
            WeekStart::Sunday => day.weekday().num_days_from_sunday(),
        };
        day.checked_sub_days(Days::new(u64::from(back)))
            .unwrap_or(day)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::local()
    }
}

/// True when `later` is exactly the calendar day after `earlier`.
pub fn is_next_day(earlier: NaiveDate, later: NaiveDate) -> bool {
    earlier.succ_opt() == Some(later)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_offset_shifts_the_day() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        let tokyo = Calendar::fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        assert_eq!(tokyo.day_of(at), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(
            Calendar::utc().day_of(at),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn week_start_is_configurable() {
        // 2024-01-03 is a Wednesday.
        let at = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        assert_eq!(
            Calendar::utc().week_of(at),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            Calendar::utc().with_week_start(WeekStart::Sunday).week_of(at),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn next_day_crosses_month_boundary() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let feb1 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(is_next_day(jan31, feb1));
        assert!(!is_next_day(feb1, jan31));
        assert!(!is_next_day(jan31, jan31));
    }

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance_secs(90);
        assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
    }
}

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::TimedRecord;
use crate::clock::Calendar;

/// Records that fall in one calendar week.
#[derive(Debug, Clone)]
pub struct WeekBucket<'a, R> {
    pub week_start: NaiveDate,
    /// Newest first.
    pub records: Vec<&'a R>,
}

impl<R> WeekBucket<'_, R> {
    pub fn week_end(&self) -> NaiveDate {
        self.week_start
            .checked_add_days(Days::new(6))
            .unwrap_or(self.week_start)
    }

    /// e.g. `Jan 1, 2024 – Jan 7, 2024`.
    pub fn label(&self) -> String {
        let start = self.week_start.format("%b %-d, %Y");
        let end = self.week_end();
        if end == self.week_start {
            return start.to_string();
        }
        format!("{start} – {}", end.format("%b %-d, %Y"))
    }
}

/// Bucket records by the week containing their reference date.
///
/// Buckets come back newest week first, and each bucket lists its records
/// newest first.
pub fn group_by_calendar_week<'a, R: TimedRecord>(
    records: &'a [R],
    calendar: &Calendar,
) -> Vec<WeekBucket<'a, R>> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&'a R>> = BTreeMap::new();
    for r in records {
        weeks
            .entry(calendar.week_of(r.reference_date()))
            .or_default()
            .push(r);
    }

    weeks
        .into_iter()
        .rev()
        .map(|(week_start, mut records)| {
            records.sort_by(|a, b| b.reference_date().cmp(&a.reference_date()));
            WeekBucket {
                week_start,
                records,
            }
        })
        .collect()
}

/// Preset minimum-duration filters for history lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFilter {
    #[default]
    All,
    Hours12,
    Hours16,
    Hours20,
}

impl HistoryFilter {
    /// Pick the strongest preset not exceeding `hours`.
    pub fn from_hours(hours: f64) -> Self {
        if hours >= 20.0 {
            HistoryFilter::Hours20
        } else if hours >= 16.0 {
            HistoryFilter::Hours16
        } else if hours >= 12.0 {
            HistoryFilter::Hours12
        } else {
            HistoryFilter::All
        }
    }

    pub fn min_duration_secs(&self) -> Option<i64> {
        match self {
            HistoryFilter::All => None,
            HistoryFilter::Hours12 => Some(12 * 3600),
            HistoryFilter::Hours16 => Some(16 * 3600),
            HistoryFilter::Hours20 => Some(20 * 3600),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HistoryFilter::All => "All fasts",
            HistoryFilter::Hours12 => "12+ hours",
            HistoryFilter::Hours16 => "16+ hours",
            HistoryFilter::Hours20 => "20+ hours",
        }
    }
}

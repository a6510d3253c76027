use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::TimedRecord;
use crate::clock::{is_next_day, Calendar};

/// Distinct calendar days on which a record ended, oldest first.
pub fn distinct_days<R: TimedRecord>(records: &[R], calendar: &Calendar) -> Vec<NaiveDate> {
    records
        .iter()
        .filter_map(|r| r.ended_at())
        .map(|end| calendar.day_of(end))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Length of the run of consecutive days ending on the most recent day.
///
/// Several records on one day count once; the walk stops at the first gap.
pub fn current_streak<R: TimedRecord>(records: &[R], calendar: &Calendar) -> u32 {
    let days = distinct_days(records, calendar);
    let mut streak = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days.into_iter().rev() {
        match previous {
            None => streak = 1,
            Some(prev) if is_next_day(day, prev) => streak += 1,
            Some(_) => break,
        }
        previous = Some(day);
    }
    streak
}

/// Longest run of consecutive days anywhere in the history.
pub fn best_streak<R: TimedRecord>(records: &[R], calendar: &Calendar) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in distinct_days(records, calendar) {
        run = match previous {
            Some(prev) if is_next_day(prev, day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

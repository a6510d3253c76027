use chrono::{DateTime, Utc};

use super::TimedRecord;

/// Record with the greatest duration. Missing durations count as zero; on a
/// tie the earliest record in the list wins.
pub fn longest<R: TimedRecord>(records: &[R]) -> Option<&R> {
    records.iter().fold(None, |best: Option<&R>, r| match best {
        Some(b) if r.duration_secs().unwrap_or(0) <= b.duration_secs().unwrap_or(0) => Some(b),
        _ => Some(r),
    })
}

/// Mean duration in seconds.
///
/// With `since`, only records that ended at or after it are counted (open
/// records are skipped). `None` when nothing is left to average.
pub fn average<R: TimedRecord>(records: &[R], since: Option<DateTime<Utc>>) -> Option<f64> {
    let mut count = 0usize;
    let mut total = 0i64;
    for r in records {
        if let Some(cutoff) = since {
            match r.ended_at() {
                Some(end) if end >= cutoff => {}
                _ => continue,
            }
        }
        count += 1;
        total += r.duration_secs().unwrap_or(0);
    }
    if count == 0 {
        return None;
    }
    Some(total as f64 / count as f64)
}

/// Sum of all known durations in seconds.
pub fn total_duration<R: TimedRecord>(records: &[R]) -> i64 {
    records.iter().filter_map(|r| r.duration_secs()).sum()
}

/// Records lasting at least `threshold_secs`; `None` keeps everything.
pub fn filter_by_min_duration<R: TimedRecord>(
    records: &[R],
    threshold_secs: Option<i64>,
) -> Vec<&R> {
    match threshold_secs {
        None => records.iter().collect(),
        Some(min) => records
            .iter()
            .filter(|r| r.duration_secs().unwrap_or(0) >= min)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::{ended, Rec};
    use chrono::{Duration, TimeZone};

    #[test]
    fn longest_prefers_first_on_tie() {
        let records = vec![ended(3, 100), ended(2, 300), ended(1, 300)];
        let best = longest(&records).unwrap();
        assert_eq!(best, &records[1]);
    }

    #[test]
    fn longest_of_empty_is_none() {
        let records: Vec<Rec> = Vec::new();
        assert!(longest(&records).is_none());
    }

    #[test]
    fn average_over_all() {
        let records = vec![ended(3, 100), ended(2, 200), ended(1, 600)];
        assert_eq!(average(&records, None), Some(300.0));
    }

    #[test]
    fn average_since_cutoff() {
        let records = vec![ended(10, 100), ended(9, 300), ended(1, 10_000)];
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(average(&records, Some(cutoff)), Some(200.0));

        let later = cutoff + Duration::days(30);
        assert_eq!(average(&records, Some(later)), None);
    }

    #[test]
    fn average_since_skips_open_records() {
        let mut open = ended(10, 100);
        open.end = None;
        let records = vec![open, ended(9, 300)];
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(average(&records, Some(cutoff)), Some(300.0));
    }

    #[test]
    fn filter_threshold() {
        let records = vec![ended(3, 12 * 3600), ended(2, 16 * 3600), ended(1, 3600)];
        assert_eq!(filter_by_min_duration(&records, None).len(), 3);
        let long = filter_by_min_duration(&records, Some(12 * 3600));
        assert_eq!(long.len(), 2);
        assert_eq!(long[0], &records[0]);
        // input untouched
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn total_skips_missing_durations() {
        let mut open = ended(3, 100);
        open.secs = None;
        let records = vec![open, ended(2, 50)];
        assert_eq!(total_duration(&records), 50);
    }
}

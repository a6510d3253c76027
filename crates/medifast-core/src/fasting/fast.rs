use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stats::TimedRecord;

/// Most completed fasts kept in history.
pub const HISTORY_CAP: usize = 500;

/// A fast. `end_at` and `duration_secs` stay empty while it is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fast {
    pub id: Uuid,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_secs: Option<i64>,
}

impl Fast {
    pub fn begin(start_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_at,
            end_at: None,
            duration_secs: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_at.is_none()
    }

    /// Close the fast at `end_at`. A clock that ran backwards yields zero.
    pub fn finish(mut self, end_at: DateTime<Utc>) -> Self {
        self.duration_secs = Some((end_at - self.start_at).num_seconds().max(0));
        self.end_at = Some(end_at);
        self
    }

    /// Seconds since the start, never negative.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_at).num_seconds().max(0)
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_secs.unwrap_or(0) as f64 / 3600.0
    }
}

impl TimedRecord for Fast {
    fn started_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    fn duration_secs(&self) -> Option<i64> {
        self.duration_secs
    }
}

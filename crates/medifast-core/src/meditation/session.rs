use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stats::TimedRecord;

/// Most completed sessions kept in history.
pub const HISTORY_CAP: usize = 500;

/// A completed meditation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Seconds, never more than the planned length.
    pub duration_secs: i64,
}

impl TimedRecord for MeditationSession {
    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    fn ended_at(&self) -> Option<DateTime<Utc>> {
        Some(self.ended_at)
    }

    fn duration_secs(&self) -> Option<i64> {
        Some(self.duration_secs)
    }
}

/// Append `session`, evicting the oldest entries beyond [`HISTORY_CAP`].
pub(crate) fn append_capped(history: &mut Vec<MeditationSession>, session: MeditationSession) {
    history.push(session);
    if history.len() > HISTORY_CAP {
        let excess = history.len() - HISTORY_CAP;
        history.drain(..excess);
    }
}

//! Fasting tracker.
//!
//! Two states: inactive, or one active [`Fast`] persisted in its own slot so a
//! restart picks it back up. Completed fasts are kept newest first.

use chrono::{DateTime, Duration, TimeDelta, Utc};
use uuid::Uuid;

use super::fast::{Fast, HISTORY_CAP};
use crate::capabilities::Capabilities;
use crate::cues::{ImpactStrength, NotifyKind};
use crate::error::ValidationError;
use crate::events::{Activity, Event};
use crate::stats::{self, HistoryFilter, WeekBucket};
use crate::storage::{keys, StoreExt};
use crate::streak::StreakState;

pub struct FastingEngine {
    caps: Capabilities,
    active: Option<Fast>,
    /// Newest first.
    history: Vec<Fast>,
    streaks: StreakState,
}

impl FastingEngine {
    pub fn new(caps: Capabilities) -> Self {
        let active = caps
            .store
            .load_as::<Fast>(keys::FASTING_ACTIVE)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable active fast");
                None
            });
        let history = caps.store.restore(keys::FASTING_HISTORY);
        let streaks = caps.store.restore(keys::FASTING_STREAKS);
        Self {
            caps,
            active,
            history,
            streaks,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active(&self) -> Option<&Fast> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn history(&self) -> &[Fast] {
        &self.history
    }

    pub fn streaks(&self) -> StreakState {
        self.streaks
    }

    /// Seconds into the running fast, or 0.
    pub fn live_elapsed(&self, now: DateTime<Utc>) -> i64 {
        self.active.as_ref().map_or(0, |f| f.elapsed_secs(now))
    }

    /// Most recently completed fast.
    pub fn last_fast(&self) -> Option<&Fast> {
        self.history.first()
    }

    pub fn longest(&self) -> Option<&Fast> {
        stats::longest(&self.history)
    }

    /// Mean duration of fasts that ended in the seven days before `now`.
    pub fn seven_day_average(&self, now: DateTime<Utc>) -> Option<f64> {
        stats::average(&self.history, Some(now - Duration::days(7)))
    }

    pub fn current_streak(&self) -> u32 {
        stats::current_streak(&self.history, &self.caps.calendar)
    }

    pub fn best_streak(&self) -> u32 {
        stats::best_streak(&self.history, &self.caps.calendar)
    }

    pub fn filtered(&self, filter: HistoryFilter) -> Vec<&Fast> {
        stats::filter_by_min_duration(&self.history, filter.min_duration_secs())
    }

    /// History grouped by calendar week, keeping only fasts that pass `filter`.
    pub fn weekly(&self, filter: HistoryFilter) -> Vec<WeekBucket<'_, Fast>> {
        let min = filter.min_duration_secs();
        stats::group_by_calendar_week(&self.history, &self.caps.calendar)
            .into_iter()
            .filter_map(|mut week| {
                week.records
                    .retain(|f| min.map_or(true, |m| f.duration_secs.unwrap_or(0) >= m));
                (!week.records.is_empty()).then_some(week)
            })
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fast now. Does nothing while one is running.
    pub fn start(&mut self) -> Vec<Event> {
        if self.active.is_some() {
            return Vec::new();
        }
        let fast = Fast::begin(self.caps.clock.now());
        self.caps.store.persist(keys::FASTING_ACTIVE, &fast);
        self.caps.cues.impact(ImpactStrength::Medium);
        tracing::debug!(id = %fast.id, "fast started");
        self.active = Some(fast.clone());
        vec![Event::FastStarted { fast }]
    }

    /// End the running fast and move it into history.
    pub fn stop(&mut self) -> Vec<Event> {
        let Some(current) = self.active.take() else {
            return Vec::new();
        };
        let end = self.caps.clock.now();
        let fast = current.finish(end);

        self.history.insert(0, fast.clone());
        self.history.truncate(HISTORY_CAP);
        self.caps.store.persist(keys::FASTING_HISTORY, &self.history);
        self.caps.store.remove(keys::FASTING_ACTIVE);

        self.streaks.record(self.caps.calendar.day_of(end));
        self.caps.store.persist(keys::FASTING_STREAKS, &self.streaks);

        self.caps.cues.notify(NotifyKind::Success);
        tracing::debug!(id = %fast.id, secs = ?fast.duration_secs, "fast ended");
        vec![
            Event::FastEnded { fast },
            Event::StreakUpdated {
                activity: Activity::Fasting,
                streak: self.streaks,
            },
        ]
    }

    /// Shift the running fast's start by a signed offset.
    ///
    /// # Errors
    /// [`ValidationError::NoActiveFast`] when nothing is running and
    /// [`ValidationError::StartInFuture`] when the new start would be after now,
    /// [`ValidationError::InvalidOffset`] when the offset is out of range.
    /// State is untouched on error.
    pub fn adjust_start(
        &mut self,
        by_hours: i64,
        by_minutes: i64,
    ) -> Result<Vec<Event>, ValidationError> {
        let now = self.caps.clock.now();
        let active = self.active.as_mut().ok_or(ValidationError::NoActiveFast)?;
        let new_start = TimeDelta::try_hours(by_hours)
            .zip(TimeDelta::try_minutes(by_minutes))
            .and_then(|(hours, minutes)| hours.checked_add(&minutes))
            .and_then(|offset| active.start_at.checked_add_signed(offset))
            .ok_or(ValidationError::InvalidOffset)?;
        if new_start > now {
            return Err(ValidationError::StartInFuture);
        }
        active.start_at = new_start;
        let event = Event::FastStartAdjusted {
            id: active.id,
            start_at: new_start,
        };
        self.caps.store.persist(keys::FASTING_ACTIVE, &*active);
        Ok(vec![event])
    }

    /// [`adjust_start`](Self::adjust_start) reporting only success.
    pub fn update_active_start_time(&mut self, by_hours: i64, by_minutes: i64) -> bool {
        self.adjust_start(by_hours, by_minutes).is_ok()
    }

    /// Drop a completed fast. Unknown ids are ignored.
    pub fn delete_fast(&mut self, id: Uuid) -> Vec<Event> {
        let before = self.history.len();
        self.history.retain(|f| f.id != id);
        if self.history.len() == before {
            return Vec::new();
        }
        self.caps.store.persist(keys::FASTING_HISTORY, &self.history);
        vec![Event::FastDeleted { id }]
    }

    pub fn clear_history(&mut self) -> Vec<Event> {
        let removed = self.history.len();
        self.history.clear();
        self.caps.store.persist(keys::FASTING_HISTORY, &self.history);
        vec![Event::FastHistoryCleared { removed }]
    }
}

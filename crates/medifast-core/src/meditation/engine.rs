//! Meditation session engine.
//!
//! A wall-clock-driven state machine. It does not use internal threads - the
//! caller delivers `tick(now, is_foreground)` roughly once a second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Warmup? -> Running{0} -> Running{1} ... -> Completed
//! ```
//!
//! Losing the foreground sets a `suspended` flag on top of `Warmup` or
//! `Running`; the phase itself is kept, so resuming needs no guesswork.
//! Background time is never added: the first foreground tick after a
//! suspension only re-anchors the clock.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = MeditationEngine::new(caps);
//! engine.start_plan(MeditationPlan::new(vec![10, 5], Some(10), Some(5)));
//! // In a loop:
//! engine.tick(Utc::now(), app_is_foreground);
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::MeditationPlan;
use super::session::{append_capped, MeditationSession};
use crate::capabilities::Capabilities;
use crate::cues::{ImpactStrength, NotifyKind, SoundCue, PULSE_INTERVAL, SESSION_PULSE};
use crate::events::{Activity, Event};
use crate::stats::{self, WeekBucket};
use crate::storage::{keys, StoreExt};
use crate::streak::StreakState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MeditationPhase {
    Idle,
    Warmup,
    Running { index: usize },
    Completed,
}

/// Point-in-time view of the engine for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationSnapshot {
    #[serde(flatten)]
    pub phase: MeditationPhase,
    pub suspended: bool,
    pub session_count: usize,
    /// Seconds into the current warm-up or session.
    pub elapsed_secs: u32,
    /// Seconds left in the current warm-up or session.
    pub remaining_secs: u32,
    /// 0.0 ..= 1.0 across warm-up and every session.
    pub progress: f64,
}

/// Meditation engine.
pub struct MeditationEngine {
    caps: Capabilities,
    /// Seconds per plan minute (1 in test mode).
    minute_secs: u32,
    plan: MeditationPlan,
    phase: MeditationPhase,
    suspended: bool,
    /// Whole seconds into the current warm-up or session.
    elapsed_secs: u32,
    session_started_at: Option<DateTime<Utc>>,
    /// Anchor for whole-second deltas. `None` while idle or suspended.
    last_tick: Option<DateTime<Utc>>,
    history: Vec<MeditationSession>,
    streaks: StreakState,
}

impl MeditationEngine {
    /// Create an idle engine, restoring the saved plan, history and streaks.
    pub fn new(caps: Capabilities) -> Self {
        let plan = caps
            .store
            .load_as::<MeditationPlan>(keys::MEDITATION_PLAN)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable meditation plan");
                None
            })
            .map(MeditationPlan::normalized)
            .unwrap_or_default();
        let history = caps.store.restore(keys::MEDITATION_SESSIONS);
        let streaks = caps.store.restore(keys::MEDITATION_STREAKS);
        Self {
            caps,
            minute_secs: 60,
            plan,
            phase: MeditationPhase::Idle,
            suspended: false,
            elapsed_secs: 0,
            session_started_at: None,
            last_tick: None,
            history,
            streaks,
        }
    }

    /// Override the length of a plan minute. `1` turns minutes into seconds.
    pub fn with_minute_secs(mut self, secs: u32) -> Self {
        self.minute_secs = secs.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> MeditationPhase {
        self.phase
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn plan(&self) -> &MeditationPlan {
        &self.plan
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn history(&self) -> &[MeditationSession] {
        &self.history
    }

    pub fn streaks(&self) -> StreakState {
        self.streaks
    }

    /// Planned length of session `index` in seconds.
    pub fn session_secs(&self, index: usize) -> u32 {
        self.plan
            .session_minutes
            .get(index)
            .map(|m| m.saturating_mul(self.minute_secs))
            .unwrap_or(0)
    }

    fn warmup_secs(&self) -> u32 {
        self.plan.warmup_secs.unwrap_or(0)
    }

    /// Length of the phase currently being timed.
    pub fn phase_secs(&self) -> u32 {
        match self.phase {
            MeditationPhase::Warmup => self.warmup_secs(),
            MeditationPhase::Running { index } => self.session_secs(index),
            MeditationPhase::Idle | MeditationPhase::Completed => 0,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.phase_secs().saturating_sub(self.elapsed_secs)
    }

    pub fn total_secs(&self) -> u32 {
        self.warmup_secs()
            .saturating_add(self.plan.total_minutes().saturating_mul(self.minute_secs))
    }

    /// 0.0 ..= 1.0 across the whole plan.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        let done = match self.phase {
            MeditationPhase::Idle => 0,
            MeditationPhase::Warmup => self.elapsed_secs,
            MeditationPhase::Running { index } => {
                self.warmup_secs()
                    .saturating_add(self.plan.cumulative_minutes(index).saturating_mul(self.minute_secs))
                    .saturating_add(self.elapsed_secs)
            }
            MeditationPhase::Completed => total,
        };
        (f64::from(done) / f64::from(total)).min(1.0)
    }

    pub fn snapshot(&self) -> MeditationSnapshot {
        MeditationSnapshot {
            phase: self.phase,
            suspended: self.suspended,
            session_count: self.plan.session_count(),
            elapsed_secs: self.elapsed_secs,
            remaining_secs: self.remaining_secs(),
            progress: self.progress(),
        }
    }

    fn is_timing(&self) -> bool {
        matches!(
            self.phase,
            MeditationPhase::Warmup | MeditationPhase::Running { .. }
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Save `plan` as the current plan without starting it.
    pub fn set_plan(&mut self, plan: MeditationPlan) {
        self.plan = plan.normalized();
        self.caps.store.persist(keys::MEDITATION_PLAN, &self.plan);
    }

    /// Start `plan` from the top, replacing whatever was running.
    pub fn start_plan(&mut self, plan: MeditationPlan) -> Vec<Event> {
        let now = self.caps.clock.now();
        let mut events = Vec::new();

        self.set_plan(plan);
        self.suspended = false;
        self.elapsed_secs = 0;
        self.session_started_at = None;
        self.last_tick = Some(now);

        events.push(Event::MeditationStarted {
            session_count: self.plan.session_count(),
            warmup_secs: self.plan.warmup_secs,
            at: now,
        });

        if self.warmup_secs() > 0 {
            self.phase = MeditationPhase::Warmup;
            tracing::debug!(warmup_secs = self.warmup_secs(), "meditation warm-up started");
        } else {
            self.begin_session(0, now, &mut events);
            self.start_cue();
        }
        events
    }

    /// Abandon the plan. The current session is not recorded.
    pub fn cancel(&mut self) -> Vec<Event> {
        let was_timing = self.is_timing();
        self.phase = MeditationPhase::Idle;
        self.suspended = false;
        self.elapsed_secs = 0;
        self.session_started_at = None;
        self.last_tick = None;
        if was_timing {
            vec![Event::MeditationCancelled {
                at: self.caps.clock.now(),
            }]
        } else {
            Vec::new()
        }
    }

    /// Advance by the whole seconds elapsed since the last foreground tick.
    ///
    /// Seconds are replayed one at a time so every midpoint and session
    /// boundary in a burst is observed.
    pub fn tick(&mut self, now: DateTime<Utc>, is_foreground: bool) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.is_timing() {
            return events;
        }

        if !is_foreground {
            if !self.suspended {
                self.suspended = true;
                self.last_tick = None;
                tracing::debug!("meditation suspended");
                events.push(Event::MeditationSuspended { at: now });
            }
            return events;
        }

        if self.suspended {
            self.suspended = false;
            self.last_tick = Some(now);
            tracing::debug!(elapsed_secs = self.elapsed_secs, "meditation resumed");
            events.push(Event::MeditationResumed { at: now });
            return events;
        }

        let Some(anchor) = self.last_tick else {
            self.last_tick = Some(now);
            return events;
        };

        let steps = (now - anchor).num_seconds();
        if steps < 0 {
            // Wall clock moved backwards; start measuring from here.
            self.last_tick = Some(now);
            return events;
        }
        if steps == 0 {
            return events;
        }

        self.last_tick = Some(anchor + Duration::seconds(steps));
        for k in 1..=steps {
            self.step(anchor + Duration::seconds(k), &mut events);
            if !self.is_timing() {
                break;
            }
        }
        events
    }

    /// Remove a session from history. Unknown ids are ignored.
    pub fn delete_session(&mut self, id: Uuid) -> Vec<Event> {
        let before = self.history.len();
        self.history.retain(|s| s.id != id);
        if self.history.len() == before {
            return Vec::new();
        }
        self.caps
            .store
            .persist(keys::MEDITATION_SESSIONS, &self.history);
        vec![Event::MeditationSessionDeleted { id }]
    }

    // ── History statistics ───────────────────────────────────────────

    pub fn longest(&self) -> Option<&MeditationSession> {
        stats::longest(&self.history)
    }

    pub fn average_secs(&self, since: Option<DateTime<Utc>>) -> Option<f64> {
        stats::average(&self.history, since)
    }

    pub fn total_minutes(&self) -> f64 {
        stats::total_duration(&self.history) as f64 / 60.0
    }

    /// Current streak recomputed from history rather than the running counters.
    pub fn history_streak(&self) -> u32 {
        stats::current_streak(&self.history, &self.caps.calendar)
    }

    pub fn best_history_streak(&self) -> u32 {
        stats::best_streak(&self.history, &self.caps.calendar)
    }

    pub fn weekly(&self) -> Vec<WeekBucket<'_, MeditationSession>> {
        stats::group_by_calendar_week(&self.history, &self.caps.calendar)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn step(&mut self, at: DateTime<Utc>, events: &mut Vec<Event>) {
        match self.phase {
            MeditationPhase::Warmup => {
                self.elapsed_secs += 1;
                if self.elapsed_secs >= self.warmup_secs() {
                    events.push(Event::WarmupFinished { at });
                    self.begin_session(0, at, events);
                    self.start_cue();
                }
            }
            MeditationPhase::Running { index } => {
                self.elapsed_secs += 1;
                if let Some(interval) = self.plan.midpoint_interval_min {
                    let every = interval.saturating_mul(self.minute_secs);
                    if every > 0 && self.elapsed_secs % every == 0 {
                        self.caps.cues.impact(ImpactStrength::Soft);
                        self.caps.cues.play_sound(SoundCue::SessionMid);
                        events.push(Event::MidpointReached {
                            session_index: index,
                            elapsed_secs: self.elapsed_secs,
                            at,
                        });
                    }
                }
                if self.elapsed_secs >= self.session_secs(index) {
                    self.finish_session(index, at, events);
                }
            }
            MeditationPhase::Idle | MeditationPhase::Completed => {}
        }
    }

    fn begin_session(&mut self, index: usize, at: DateTime<Utc>, events: &mut Vec<Event>) {
        self.phase = MeditationPhase::Running { index };
        self.elapsed_secs = 0;
        self.session_started_at = Some(at);
        tracing::debug!(index, secs = self.session_secs(index), "meditation session started");
        events.push(Event::SessionStarted {
            session_index: index,
            duration_secs: self.session_secs(index),
            at,
        });
    }

    fn finish_session(&mut self, index: usize, at: DateTime<Utc>, events: &mut Vec<Event>) {
        let started_at = self.session_started_at.unwrap_or(at);
        let planned = i64::from(self.session_secs(index));
        let session = MeditationSession {
            id: Uuid::new_v4(),
            started_at,
            ended_at: at,
            duration_secs: (at - started_at).num_seconds().clamp(0, planned),
        };

        append_capped(&mut self.history, session.clone());
        self.caps
            .store
            .persist(keys::MEDITATION_SESSIONS, &self.history);

        self.streaks.record(self.caps.calendar.day_of(at));
        self.caps
            .store
            .persist(keys::MEDITATION_STREAKS, &self.streaks);

        tracing::debug!(index, duration_secs = session.duration_secs, "meditation session completed");
        events.push(Event::SessionCompleted {
            session_index: index,
            session,
        });
        events.push(Event::StreakUpdated {
            activity: Activity::Meditation,
            streak: self.streaks,
        });

        if self.plan.vibrate_after_session {
            self.caps
                .cues
                .pulse(SESSION_PULSE, PULSE_INTERVAL, ImpactStrength::Medium);
        }
        if self.plan.ding_after_session {
            self.caps.cues.play_sound(SoundCue::SessionMid);
        }

        if index + 1 < self.plan.session_count() {
            self.begin_session(index + 1, at, events);
        } else {
            self.phase = MeditationPhase::Completed;
            self.session_started_at = None;
            self.last_tick = None;
            self.caps.cues.notify(NotifyKind::Success);
            self.caps.cues.play_sound(SoundCue::SessionEnd);
            events.push(Event::MeditationCompleted {
                sessions: self.plan.session_count(),
                at,
            });
        }
    }

    fn start_cue(&self) {
        self.caps.cues.impact(ImpactStrength::Light);
        self.caps.cues.play_sound(SoundCue::SessionStart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Calendar, ManualClock};
    use crate::cues::{Cue, RecordingCues};
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::rc::Rc;

    struct Rig {
        engine: MeditationEngine,
        cues: Rc<RecordingCues>,
        store: Rc<MemoryStore>,
        t0: DateTime<Utc>,
    }

    fn rig() -> Rig {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let cues = Rc::new(RecordingCues::new());
        let store = Rc::new(MemoryStore::new());
        let caps = Capabilities::new(
            store.clone(),
            cues.clone(),
            Rc::new(ManualClock::new(t0)),
            Calendar::utc(),
        );
        Rig {
            engine: MeditationEngine::new(caps),
            cues,
            store,
            t0,
        }
    }

    fn secs(t0: DateTime<Utc>, s: i64) -> DateTime<Utc> {
        t0 + Duration::seconds(s)
    }

    #[test]
    fn start_without_warmup_runs_first_session() {
        let mut r = rig();
        let events = r.engine.start_plan(MeditationPlan::single(5));
        assert_eq!(r.engine.phase(), MeditationPhase::Running { index: 0 });
        assert!(matches!(events[1], Event::SessionStarted { session_index: 0, duration_secs: 300, .. }));
        assert_eq!(r.cues.count_sound(SoundCue::SessionStart), 1);
    }

    #[test]
    fn warmup_then_start_cue() {
        let mut r = rig();
        r.engine.start_plan(MeditationPlan::new(vec![1], Some(3), None));
        assert_eq!(r.engine.phase(), MeditationPhase::Warmup);
        assert!(r.cues.sounds().is_empty());

        r.engine.tick(secs(r.t0, 2), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Warmup);
        let events = r.engine.tick(secs(r.t0, 3), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Running { index: 0 });
        assert!(matches!(events[0], Event::WarmupFinished { .. }));
        assert_eq!(r.cues.count_sound(SoundCue::SessionStart), 1);
        assert_eq!(r.engine.elapsed_secs(), 0);
    }

    #[test]
    fn background_time_is_dropped() {
        let mut r = rig();
        r.engine.start_plan(MeditationPlan::single(5));
        r.engine.tick(secs(r.t0, 10), true);
        assert_eq!(r.engine.elapsed_secs(), 10);

        r.engine.tick(secs(r.t0, 11), false);
        assert!(r.engine.is_suspended());
        r.engine.tick(secs(r.t0, 111), true);
        assert!(!r.engine.is_suspended());
        assert_eq!(r.engine.elapsed_secs(), 10);

        r.engine.tick(secs(r.t0, 112), true);
        assert_eq!(r.engine.elapsed_secs(), 11);
    }

    #[test]
    fn suspension_keeps_warmup_phase() {
        let mut r = rig();
        r.engine.start_plan(MeditationPlan::new(vec![1], Some(10), None));
        r.engine.tick(secs(r.t0, 4), true);
        r.engine.tick(secs(r.t0, 5), false);
        r.engine.tick(secs(r.t0, 500), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Warmup);
        assert_eq!(r.engine.elapsed_secs(), 4);
    }

    #[test]
    fn catch_up_fires_every_midpoint() {
        let mut r = rig();
        r.engine = r.engine.with_minute_secs(1);
        r.engine.start_plan(MeditationPlan::new(vec![10], None, Some(1)));
        let events = r.engine.tick(secs(r.t0, 3), true);
        let midpoints = events
            .iter()
            .filter(|e| matches!(e, Event::MidpointReached { .. }))
            .count();
        assert_eq!(midpoints, 3);
        assert_eq!(r.cues.count_sound(SoundCue::SessionMid), 3);
    }

    #[test]
    fn midpoint_is_relative_to_each_session() {
        let mut r = rig();
        r.engine = r.engine.with_minute_secs(1);
        r.engine.start_plan(MeditationPlan::new(vec![3, 3], None, Some(2)));
        let events = r.engine.tick(secs(r.t0, 6), true);
        let marks: Vec<(usize, u32)> = events
            .iter()
            .filter_map(|e| match e {
                Event::MidpointReached {
                    session_index,
                    elapsed_secs,
                    ..
                } => Some((*session_index, *elapsed_secs)),
                _ => None,
            })
            .collect();
        assert_eq!(marks, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn chained_sessions_record_each_and_end_once() {
        let mut r = rig();
        r.engine = r.engine.with_minute_secs(1);
        r.engine
            .start_plan(MeditationPlan::new(vec![2, 3], None, None).with_post_session_cues(true, false));
        r.engine.tick(secs(r.t0, 2), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Running { index: 1 });
        assert_eq!(r.engine.history().len(), 1);

        r.engine.tick(secs(r.t0, 5), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Completed);
        assert_eq!(r.engine.history().len(), 2);
        assert_eq!(r.engine.history()[1].duration_secs, 3);

        assert_eq!(r.cues.count_sound(SoundCue::SessionStart), 1);
        assert_eq!(r.cues.count_sound(SoundCue::SessionEnd), 1);
        let pulses = r
            .cues
            .cues()
            .into_iter()
            .filter(|c| matches!(c, Cue::Pulse { .. }))
            .count();
        assert_eq!(pulses, 2);
        assert!(r.store.contains(keys::MEDITATION_SESSIONS));
    }

    #[test]
    fn duration_is_clamped_to_plan() {
        let mut r = rig();
        r.engine = r.engine.with_minute_secs(1);
        r.engine.start_plan(MeditationPlan::single(5));
        r.engine.tick(secs(r.t0, 2), true);
        r.engine.tick(secs(r.t0, 3), false);
        r.engine.tick(secs(r.t0, 60), true);
        r.engine.tick(secs(r.t0, 63), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Completed);
        let s = &r.engine.history()[0];
        assert_eq!(s.duration_secs, 5);
        assert_eq!(s.started_at, r.t0);
        assert_eq!(s.ended_at, secs(r.t0, 63));
    }

    #[test]
    fn restart_replaces_running_plan() {
        let mut r = rig();
        r.engine.start_plan(MeditationPlan::single(5));
        r.engine.tick(secs(r.t0, 30), true);
        r.engine.start_plan(MeditationPlan::single(7));
        assert_eq!(r.engine.elapsed_secs(), 0);
        assert_eq!(r.engine.remaining_secs(), 420);
        assert!(r.engine.history().is_empty());
    }

    #[test]
    fn cancel_discards_session() {
        let mut r = rig();
        r.engine.start_plan(MeditationPlan::single(5));
        r.engine.tick(secs(r.t0, 30), true);
        let events = r.engine.cancel();
        assert_eq!(events.len(), 1);
        assert_eq!(r.engine.phase(), MeditationPhase::Idle);
        assert!(r.engine.tick(secs(r.t0, 400), true).is_empty());
        assert!(r.engine.history().is_empty());
    }

    #[test]
    fn failed_writes_do_not_stop_the_session() {
        let mut r = rig();
        r.store.fail_writes(true);
        r.engine = r.engine.with_minute_secs(1);
        r.engine.start_plan(MeditationPlan::single(2));
        r.engine.tick(secs(r.t0, 2), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Completed);
        assert_eq!(r.engine.history().len(), 1);
        assert_eq!(r.engine.streaks().current_streak, 1);
    }

    #[test]
    fn progress_spans_plan() {
        let mut r = rig();
        r.engine = r.engine.with_minute_secs(1);
        r.engine.start_plan(MeditationPlan::new(vec![5, 5], Some(10), None));
        assert_eq!(r.engine.progress(), 0.0);
        r.engine.tick(secs(r.t0, 15), true);
        assert_eq!(r.engine.phase(), MeditationPhase::Running { index: 1 });
        assert_eq!(r.engine.progress(), 0.75);
    }

    #[test]
    fn huge_warmup_saturates_totals() {
        let mut r = rig();
        r.engine
            .start_plan(MeditationPlan::new(vec![59; 9], Some(u32::MAX), None));
        assert_eq!(r.engine.total_secs(), u32::MAX);
        assert_eq!(r.engine.progress(), 0.0);

        r.engine.tick(secs(r.t0, 1), true);
        let snap = r.engine.snapshot();
        assert_eq!(snap.phase, MeditationPhase::Warmup);
        assert_eq!(snap.remaining_secs, u32::MAX - 1);
        assert!(snap.progress > 0.0 && snap.progress < 1.0);
    }
}

//! Guided breathing engine.
//!
//! Each round runs paced breaths, then a breath-hold (retention), then a
//! short recovery countdown:
//!
//! ```text
//! Idle -> Breathing -> Retention -> Recovery -> Breathing (next round)
//!                                           \-> Completed
//! ```
//!
//! Time only moves on foreground ticks. Unlike meditation there is no
//! suspension bookkeeping: background ticks are simply ignored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::settings::{BreathingRoundResult, BreathingSettings};
use crate::capabilities::Capabilities;
use crate::cues::{ImpactStrength, NotifyKind, SoundCue, PULSE_INTERVAL, ROUND_PULSE};
use crate::events::Event;
use crate::format;
use crate::storage::{keys, StoreExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingPhase {
    Idle,
    Breathing,
    Retention,
    Recovery,
    Completed,
}

impl BreathingPhase {
    pub fn title(&self) -> &'static str {
        match self {
            BreathingPhase::Idle => "Ready",
            BreathingPhase::Breathing => "Take deep breaths",
            BreathingPhase::Retention => "Let go and hold",
            BreathingPhase::Recovery => "Recovery breath",
            BreathingPhase::Completed => "Completed",
        }
    }
}

/// Half of a paced breath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathDirection {
    Inhale,
    Exhale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingSnapshot {
    pub phase: BreathingPhase,
    pub title: String,
    pub round: u32,
    pub rounds: u32,
    pub breaths: u32,
    pub breaths_per_round: u32,
    pub retention_secs: u32,
    pub recovery_remaining_secs: u32,
    pub breath: BreathDirection,
    pub breath_progress: f64,
    pub display: String,
    pub rounds_recorded: usize,
}

pub struct BreathingEngine {
    caps: Capabilities,
    settings: BreathingSettings,
    phase: BreathingPhase,
    round: u32,
    breaths: u32,
    retention_secs: u32,
    recovery_remaining: u32,
    /// Foreground ticks into the current paced breath.
    pace_counter: u32,
    results: Vec<BreathingRoundResult>,
}

impl BreathingEngine {
    /// Idle engine with the saved settings and last session's rounds.
    pub fn new(caps: Capabilities) -> Self {
        let settings = caps
            .store
            .restore::<BreathingSettings>(keys::BREATHING_SETTINGS)
            .normalized();
        let results = caps.store.restore(keys::BREATHING_HISTORY);
        Self {
            caps,
            settings,
            phase: BreathingPhase::Idle,
            round: 0,
            breaths: 0,
            retention_secs: 0,
            recovery_remaining: 0,
            pace_counter: 0,
            results,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> BreathingPhase {
        self.phase
    }

    pub fn settings(&self) -> &BreathingSettings {
        &self.settings
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn breaths(&self) -> u32 {
        self.breaths
    }

    pub fn retention_secs(&self) -> u32 {
        self.retention_secs
    }

    pub fn recovery_remaining_secs(&self) -> u32 {
        self.recovery_remaining
    }

    /// Rounds recorded in this session, or the last saved session while idle.
    pub fn results(&self) -> &[BreathingRoundResult] {
        &self.results
    }

    /// Longest retention among the recorded rounds.
    pub fn best_retention_secs(&self) -> Option<u32> {
        self.results.iter().map(|r| r.retention_secs).max()
    }

    /// Inhale for the first half of each breath, rounding the split up.
    pub fn breath_direction(&self) -> BreathDirection {
        if self.phase != BreathingPhase::Breathing {
            return BreathDirection::Exhale;
        }
        let pivot = (self.settings.pace_secs.max(1) + 1) / 2;
        if self.pace_counter < pivot {
            BreathDirection::Inhale
        } else {
            BreathDirection::Exhale
        }
    }

    /// 0.0 ..= 1.0 within the current breath.
    pub fn breath_progress(&self) -> f64 {
        let pace = self.settings.pace_secs.max(1);
        (f64::from(self.pace_counter) / f64::from(pace)).min(1.0)
    }

    /// Main figure for the current phase.
    pub fn display_value(&self) -> String {
        match self.phase {
            BreathingPhase::Idle => String::new(),
            BreathingPhase::Breathing => self.breaths.to_string(),
            BreathingPhase::Retention => format::ms(i64::from(self.retention_secs)),
            BreathingPhase::Recovery => format::ms(i64::from(self.recovery_remaining)),
            BreathingPhase::Completed => "Done".to_string(),
        }
    }

    pub fn snapshot(&self) -> BreathingSnapshot {
        BreathingSnapshot {
            phase: self.phase,
            title: self.phase.title().to_string(),
            round: self.round,
            rounds: self.settings.rounds,
            breaths: self.breaths,
            breaths_per_round: self.settings.breaths_per_round,
            retention_secs: self.retention_secs,
            recovery_remaining_secs: self.recovery_remaining,
            breath: self.breath_direction(),
            breath_progress: self.breath_progress(),
            display: self.display_value(),
            rounds_recorded: self.results.len(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Save `settings` as the defaults without starting a session.
    pub fn set_settings(&mut self, settings: BreathingSettings) {
        self.settings = settings.normalized();
        self.caps
            .store
            .persist(keys::BREATHING_SETTINGS, &self.settings);
    }

    /// Begin round one with `settings`, which also become the saved defaults.
    pub fn start_settings(&mut self, settings: BreathingSettings) -> Vec<Event> {
        self.set_settings(settings);
        self.results.clear();
        self.round = 1;
        self.reset_round_counters();
        self.phase = BreathingPhase::Breathing;
        tracing::debug!(rounds = self.settings.rounds, "breathing session started");
        vec![
            Event::BreathingStarted {
                rounds: self.settings.rounds,
            },
            Event::RoundStarted { round: 1 },
        ]
    }

    /// Count one breath by hand, up to the round target.
    pub fn single_tap(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.phase == BreathingPhase::Breathing {
            self.count_breath(&mut events);
        }
        events
    }

    /// Move to the next step of the round.
    pub fn double_tap(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            BreathingPhase::Breathing => self.start_retention(&mut events),
            BreathingPhase::Retention => self.start_recovery(&mut events),
            BreathingPhase::Recovery => self.advance_after_recovery(&mut events),
            BreathingPhase::Idle | BreathingPhase::Completed => {}
        }
        events
    }

    /// End the session now, keeping every round recorded so far.
    pub fn finish_early(&mut self) -> Vec<Event> {
        if matches!(self.phase, BreathingPhase::Idle | BreathingPhase::Completed) {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.complete(true, &mut events);
        events
    }

    /// One second of foreground time. Background ticks do nothing.
    pub fn tick(&mut self, is_foreground: bool) -> Vec<Event> {
        let mut events = Vec::new();
        if !is_foreground {
            return events;
        }
        match self.phase {
            BreathingPhase::Breathing => {
                self.pace_counter += 1;
                if self.pace_counter >= self.settings.pace_secs.max(1) {
                    self.pace_counter = 0;
                    self.count_breath(&mut events);
                }
            }
            BreathingPhase::Retention => self.retention_secs += 1,
            BreathingPhase::Recovery => {
                self.recovery_remaining = self.recovery_remaining.saturating_sub(1);
                if self.recovery_remaining == 0 {
                    self.advance_after_recovery(&mut events);
                }
            }
            BreathingPhase::Idle | BreathingPhase::Completed => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_round_counters(&mut self) {
        self.breaths = 0;
        self.retention_secs = 0;
        self.recovery_remaining = 0;
        self.pace_counter = 0;
    }

    fn count_breath(&mut self, events: &mut Vec<Event>) {
        let target = self.settings.breaths_per_round;
        if self.breaths >= target {
            return;
        }
        self.breaths += 1;
        events.push(Event::BreathCounted {
            round: self.round,
            breaths: self.breaths,
        });
        if self.breaths == target {
            self.caps.cues.impact(ImpactStrength::Soft);
            events.push(Event::BreathTargetReached {
                round: self.round,
                breaths: self.breaths,
            });
        }
    }

    fn start_retention(&mut self, events: &mut Vec<Event>) {
        self.phase = BreathingPhase::Retention;
        self.retention_secs = 0;
        self.pace_counter = 0;
        self.caps.cues.impact(ImpactStrength::Medium);
        events.push(Event::RetentionStarted { round: self.round });
    }

    fn start_recovery(&mut self, events: &mut Vec<Event>) {
        self.phase = BreathingPhase::Recovery;
        self.recovery_remaining = self.settings.recovery_hold_secs;
        self.pace_counter = 0;

        let result = BreathingRoundResult {
            id: Uuid::new_v4(),
            round_number: self.round,
            breaths_completed: self.breaths,
            retention_secs: self.retention_secs,
        };
        tracing::debug!(round = self.round, retention_secs = self.retention_secs, "breathing round recorded");
        self.results.push(result.clone());
        events.push(Event::RoundRecorded { result });

        if self.settings.vibrate_after_round {
            self.caps
                .cues
                .pulse(ROUND_PULSE, PULSE_INTERVAL, ImpactStrength::Medium);
        }
        if self.settings.ding_after_round {
            self.caps.cues.play_sound(SoundCue::SessionMid);
        }
    }

    fn advance_after_recovery(&mut self, events: &mut Vec<Event>) {
        if self.round < self.settings.rounds {
            self.round += 1;
            self.reset_round_counters();
            self.phase = BreathingPhase::Breathing;
            self.caps.cues.notify(NotifyKind::Success);
            events.push(Event::RoundStarted { round: self.round });
        } else {
            self.complete(false, events);
        }
    }

    fn complete(&mut self, early: bool, events: &mut Vec<Event>) {
        self.phase = BreathingPhase::Completed;
        self.recovery_remaining = 0;
        self.pace_counter = 0;
        self.caps
            .store
            .persist(keys::BREATHING_HISTORY, &self.results);
        self.caps.cues.notify(NotifyKind::Success);
        self.caps.cues.play_sound(SoundCue::SessionEnd);
        tracing::debug!(rounds = self.results.len(), early, "breathing session completed");
        events.push(Event::BreathingCompleted {
            rounds_recorded: self.results.len(),
            early,
        });
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breathing::BreathingRoundResult;
use crate::fasting::Fast;
use crate::meditation::MeditationSession;
use crate::streak::StreakState;

/// Every state change in an engine produces an Event.
/// Mutating calls return the events they caused, in order; the UI layer
/// renders them or ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // ── Meditation ───────────────────────────────────────────────────
    MeditationStarted {
        session_count: usize,
        warmup_secs: Option<u32>,
        at: DateTime<Utc>,
    },
    WarmupFinished {
        at: DateTime<Utc>,
    },
    /// A chained session began (also emitted for the first session).
    SessionStarted {
        session_index: usize,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    MidpointReached {
        session_index: usize,
        elapsed_secs: u32,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_index: usize,
        session: MeditationSession,
    },
    MeditationCompleted {
        sessions: usize,
        at: DateTime<Utc>,
    },
    MeditationCancelled {
        at: DateTime<Utc>,
    },
    /// Foreground lost; the clock is frozen.
    MeditationSuspended {
        at: DateTime<Utc>,
    },
    MeditationResumed {
        at: DateTime<Utc>,
    },
    MeditationSessionDeleted {
        id: Uuid,
    },

    // ── Breathing ────────────────────────────────────────────────────
    BreathingStarted {
        rounds: u32,
    },
    BreathCounted {
        round: u32,
        breaths: u32,
    },
    BreathTargetReached {
        round: u32,
        breaths: u32,
    },
    RetentionStarted {
        round: u32,
    },
    RoundRecorded {
        result: BreathingRoundResult,
    },
    RoundStarted {
        round: u32,
    },
    BreathingCompleted {
        rounds_recorded: usize,
        early: bool,
    },

    // ── Fasting ──────────────────────────────────────────────────────
    FastStarted {
        fast: Fast,
    },
    FastEnded {
        fast: Fast,
    },
    FastStartAdjusted {
        id: Uuid,
        start_at: DateTime<Utc>,
    },
    FastDeleted {
        id: Uuid,
    },
    FastHistoryCleared {
        removed: usize,
    },

    // ── Shared ───────────────────────────────────────────────────────
    StreakUpdated {
        activity: Activity,
        streak: StreakState,
    },
}

/// The three guided activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Meditation,
    Breathing,
    Fasting,
}

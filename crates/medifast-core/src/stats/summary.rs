use serde::{Deserialize, Serialize};

use super::{current_streak, longest, total_duration};
use crate::breathing::BreathingRoundResult;
use crate::clock::Calendar;
use crate::fasting::Fast;
use crate::meditation::MeditationSession;
use crate::storage::{keys, Store, StoreExt};
use crate::streak::StreakState;

/// One-glance totals across all three activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub meditation_streak: u32,
    pub meditation_sessions: usize,
    pub meditation_minutes: f64,

    /// Best hold of the most recent breathing session.
    pub breathing_best_retention_secs: Option<u32>,
    pub breathing_rounds: usize,

    pub fasting_streak: u32,
    pub fasting_count: usize,
    pub fasting_longest_hours: Option<f64>,
}

impl ActivityStats {
    pub fn compute(
        meditation: &[MeditationSession],
        meditation_streaks: &StreakState,
        breathing: &[BreathingRoundResult],
        fasts: &[Fast],
        calendar: &Calendar,
    ) -> Self {
        Self {
            meditation_streak: meditation_streaks.current_streak,
            meditation_sessions: meditation.len(),
            meditation_minutes: total_duration(meditation) as f64 / 60.0,
            breathing_best_retention_secs: breathing.iter().map(|r| r.retention_secs).max(),
            breathing_rounds: breathing.len(),
            fasting_streak: current_streak(fasts, calendar),
            fasting_count: fasts.len(),
            fasting_longest_hours: longest(fasts)
                .and_then(|f| f.duration_secs)
                .map(|secs| secs as f64 / 3600.0),
        }
    }

    /// Read every history from `store`. Unreadable entries count as empty.
    pub fn load(store: &dyn Store, calendar: &Calendar) -> Self {
        let sessions: Vec<MeditationSession> = store.restore(keys::MEDITATION_SESSIONS);
        let streaks: StreakState = store.restore(keys::MEDITATION_STREAKS);
        let rounds: Vec<BreathingRoundResult> = store.restore(keys::BREATHING_HISTORY);
        let fasts: Vec<Fast> = store.restore(keys::FASTING_HISTORY);
        Self::compute(&sessions, &streaks, &rounds, &fasts, calendar)
    }
}

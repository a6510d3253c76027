use serde::{Deserialize, Serialize};

/// Most sessions a plan can chain.
pub const MAX_SESSIONS: usize = 9;
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 59;
/// Length of the single session used when a plan is empty.
pub const DEFAULT_MINUTES: u32 = 10;

/// A chain of meditation sessions run back to back.
///
/// Constructed through [`MeditationPlan::new`] or [`MeditationPlan::normalized`],
/// a plan always holds 1..=9 sessions of 1..=59 minutes each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationPlan {
    /// Per-session length in minutes, in run order.
    pub session_minutes: Vec<u32>,
    /// Optional warm-up before the first session only.
    #[serde(default)]
    pub warmup_secs: Option<u32>,
    /// Ring a bell every N minutes into each session.
    #[serde(default)]
    pub midpoint_interval_min: Option<u32>,
    #[serde(default)]
    pub vibrate_after_session: bool,
    #[serde(default)]
    pub ding_after_session: bool,
}

impl MeditationPlan {
    pub fn new(
        session_minutes: Vec<u32>,
        warmup_secs: Option<u32>,
        midpoint_interval_min: Option<u32>,
    ) -> Self {
        Self {
            session_minutes,
            warmup_secs,
            midpoint_interval_min,
            vibrate_after_session: false,
            ding_after_session: false,
        }
        .normalized()
    }

    /// One session of `minutes`.
    pub fn single(minutes: u32) -> Self {
        Self::new(vec![minutes], None, None)
    }

    pub fn with_post_session_cues(mut self, vibrate: bool, ding: bool) -> Self {
        self.vibrate_after_session = vibrate;
        self.ding_after_session = ding;
        self
    }

    /// Enforce the plan invariants: at most nine sessions, every length and
    /// the midpoint interval within 1..=59 minutes, and a zero warm-up treated
    /// as none. An empty plan becomes a single 10-minute session.
    pub fn normalized(mut self) -> Self {
        self.session_minutes = clamp_sessions(&self.session_minutes);
        self.midpoint_interval_min = self.midpoint_interval_min.map(clamp_minutes);
        self.warmup_secs = self.warmup_secs.filter(|s| *s > 0);
        self
    }

    pub fn session_count(&self) -> usize {
        self.session_minutes.len()
    }

    pub fn total_minutes(&self) -> u32 {
        self.session_minutes.iter().sum()
    }

    /// Minutes completed before (not including) `index`.
    pub fn cumulative_minutes(&self, index: usize) -> u32 {
        self.session_minutes.iter().take(index).sum()
    }
}

impl Default for MeditationPlan {
    fn default() -> Self {
        Self::single(DEFAULT_MINUTES)
    }
}

fn clamp_minutes(value: u32) -> u32 {
    value.clamp(MIN_MINUTES, MAX_MINUTES)
}

fn clamp_sessions(values: &[u32]) -> Vec<u32> {
    if values.is_empty() {
        return vec![DEFAULT_MINUTES];
    }
    values
        .iter()
        .take(MAX_SESSIONS)
        .map(|v| clamp_minutes(*v))
        .collect()
}

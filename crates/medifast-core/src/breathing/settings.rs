use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_ROUNDS: u32 = 3;
pub const DEFAULT_BREATHS: u32 = 30;
pub const DEFAULT_RECOVERY_SECS: u32 = 15;
pub const DEFAULT_PACE_SECS: u32 = 3;

/// User defaults for a breathing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingSettings {
    pub rounds: u32,
    pub breaths_per_round: u32,
    pub recovery_hold_secs: u32,
    /// Seconds per auto-paced breath. Older saves lack it.
    #[serde(default = "default_pace")]
    pub pace_secs: u32,
    #[serde(default)]
    pub vibrate_after_round: bool,
    #[serde(default)]
    pub ding_after_round: bool,
}

fn default_pace() -> u32 {
    DEFAULT_PACE_SECS
}

impl BreathingSettings {
    pub fn new(rounds: u32, breaths_per_round: u32, recovery_hold_secs: u32, pace_secs: u32) -> Self {
        Self {
            rounds,
            breaths_per_round,
            recovery_hold_secs,
            pace_secs,
            vibrate_after_round: false,
            ding_after_round: false,
        }
        .normalized()
    }

    pub fn with_round_cues(mut self, vibrate: bool, ding: bool) -> Self {
        self.vibrate_after_round = vibrate;
        self.ding_after_round = ding;
        self
    }

    /// At least one round, one breath, and a one-second pace.
    pub fn normalized(mut self) -> Self {
        self.rounds = self.rounds.max(1);
        self.breaths_per_round = self.breaths_per_round.max(1);
        self.pace_secs = self.pace_secs.max(1);
        self
    }
}

impl Default for BreathingSettings {
    fn default() -> Self {
        Self::new(
            DEFAULT_ROUNDS,
            DEFAULT_BREATHS,
            DEFAULT_RECOVERY_SECS,
            DEFAULT_PACE_SECS,
        )
    }
}

/// Outcome of one breathing round, fixed once recovery begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingRoundResult {
    pub id: Uuid,
    pub round_number: u32,
    pub breaths_completed: u32,
    pub retention_secs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = BreathingSettings::default();
        assert_eq!(
            (s.rounds, s.breaths_per_round, s.recovery_hold_secs, s.pace_secs),
            (3, 30, 15, 3)
        );
    }

    #[test]
    fn missing_pace_decodes_as_three() {
        let s: BreathingSettings = serde_json::from_str(
            r#"{"rounds":4,"breaths_per_round":20,"recovery_hold_secs":10}"#,
        )
        .unwrap();
        assert_eq!(s.pace_secs, 3);
        assert!(!s.vibrate_after_round);
        assert!(!s.ding_after_round);
    }

    #[test]
    fn zero_values_are_raised() {
        let s = BreathingSettings::new(0, 0, 0, 0);
        assert_eq!((s.rounds, s.breaths_per_round, s.pace_secs), (1, 1, 1));
        assert_eq!(s.recovery_hold_secs, 0);
    }
}

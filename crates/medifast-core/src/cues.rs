//! Audio and haptic cue capability.
//!
//! Engines fire cues at phase boundaries and never look at the outcome: a
//! missing sound asset or a device without haptics must not change session
//! state, so every method returns `()`.

use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactStrength {
    Light,
    Medium,
    Heavy,
    Soft,
    Rigid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Success,
    Warning,
    Error,
}

/// Bundled bell sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundCue {
    SessionStart,
    SessionMid,
    SessionEnd,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::SessionStart => "session-start",
            SoundCue::SessionMid => "session-mid",
            SoundCue::SessionEnd => "session-end",
        }
    }
}

/// Sensory output device.
pub trait CueEmitter {
    /// Single tactile pulse.
    fn impact(&self, strength: ImpactStrength);

    /// Tactile pattern signalling an outcome.
    fn notify(&self, kind: NotifyKind);

    fn play_sound(&self, sound: SoundCue);

    /// Repeated impacts approximating a sustained vibration.
    fn pulse(&self, duration: Duration, interval: Duration, strength: ImpactStrength);
}

/// Pulse length used after a chained meditation session.
pub const SESSION_PULSE: Duration = Duration::from_secs(2);
/// Pulse length used after a breathing round.
pub const ROUND_PULSE: Duration = Duration::from_secs(1);
pub const PULSE_INTERVAL: Duration = Duration::from_millis(250);

/// Number of impacts a pulse of `duration` fires at `interval` spacing.
pub fn pulse_count(duration: Duration, interval: Duration) -> usize {
    if duration.is_zero() || interval.is_zero() {
        return 0;
    }
    let ratio = duration.as_secs_f64() / interval.as_secs_f64();
    (ratio.ceil() as usize).max(1)
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CueEmitter for SilentCues {
    fn impact(&self, _strength: ImpactStrength) {}
    fn notify(&self, _kind: NotifyKind) {}
    fn play_sound(&self, _sound: SoundCue) {}
    fn pulse(&self, _duration: Duration, _interval: Duration, _strength: ImpactStrength) {}
}

/// A cue as captured by [`RecordingCues`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    Impact(ImpactStrength),
    Notify(NotifyKind),
    Sound(SoundCue),
    Pulse {
        duration: Duration,
        interval: Duration,
        strength: ImpactStrength,
    },
}

/// Keeps every cue in order of emission.
#[derive(Debug, Default)]
pub struct RecordingCues {
    cues: RefCell<Vec<Cue>>,
}

impl RecordingCues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Cue> {
        std::mem::take(&mut *self.cues.borrow_mut())
    }

    pub fn sounds(&self) -> Vec<SoundCue> {
        self.cues
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Cue::Sound(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn count_sound(&self, sound: SoundCue) -> usize {
        self.sounds().into_iter().filter(|s| *s == sound).count()
    }
}

impl CueEmitter for RecordingCues {
    fn impact(&self, strength: ImpactStrength) {
        self.cues.borrow_mut().push(Cue::Impact(strength));
    }

    fn notify(&self, kind: NotifyKind) {
        self.cues.borrow_mut().push(Cue::Notify(kind));
    }

    fn play_sound(&self, sound: SoundCue) {
        self.cues.borrow_mut().push(Cue::Sound(sound));
    }

    fn pulse(&self, duration: Duration, interval: Duration, strength: ImpactStrength) {
        self.cues.borrow_mut().push(Cue::Pulse {
            duration,
            interval,
            strength,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_count_rounds_up() {
        assert_eq!(pulse_count(SESSION_PULSE, PULSE_INTERVAL), 8);
        assert_eq!(
            pulse_count(Duration::from_millis(300), PULSE_INTERVAL),
            2
        );
        assert_eq!(pulse_count(Duration::ZERO, PULSE_INTERVAL), 0);
    }

    #[test]
    fn recording_keeps_order() {
        let cues = RecordingCues::new();
        cues.impact(ImpactStrength::Light);
        cues.play_sound(SoundCue::SessionStart);
        assert_eq!(
            cues.take(),
            vec![
                Cue::Impact(ImpactStrength::Light),
                Cue::Sound(SoundCue::SessionStart)
            ]
        );
        assert!(cues.cues().is_empty());
    }

    #[test]
    fn sound_ids_are_kebab_case() {
        assert_eq!(SoundCue::SessionMid.as_str(), "session-mid");
        assert_eq!(
            serde_json::to_string(&SoundCue::SessionEnd).unwrap(),
            "\"session-end\""
        );
    }
}

//! Cue output for a terminal: the bell character for sounds and short
//! markers on stderr in place of haptics.

use std::io::Write;
use std::time::Duration;

use medifast_core::cues::pulse_count;
use medifast_core::storage::CuesConfig;
use medifast_core::{CueEmitter, ImpactStrength, NotifyKind, SoundCue};

pub struct TerminalCues {
    sound: bool,
    haptics: bool,
}

impl TerminalCues {
    pub fn from_config(config: &CuesConfig) -> Self {
        Self {
            sound: config.sound,
            haptics: config.haptics,
        }
    }

    fn marker(&self, text: &str) {
        if self.haptics {
            eprintln!("\r[{text}]");
        }
    }
}

impl CueEmitter for TerminalCues {
    fn impact(&self, strength: ImpactStrength) {
        tracing::debug!(?strength, "impact");
        self.marker(&format!("{strength:?}").to_lowercase());
    }

    fn notify(&self, kind: NotifyKind) {
        tracing::debug!(?kind, "notify");
        self.marker(&format!("{kind:?}").to_lowercase());
    }

    fn play_sound(&self, sound: SoundCue) {
        tracing::debug!(sound = sound.as_str(), "sound");
        if self.sound {
            let mut err = std::io::stderr();
            // Ignored if stderr is closed.
            let _ = write!(err, "\x07");
            let _ = err.flush();
        }
        self.marker(sound.as_str());
    }

    fn pulse(&self, duration: Duration, interval: Duration, strength: ImpactStrength) {
        let count = pulse_count(duration, interval);
        tracing::debug!(count, ?strength, "pulse");
        if count > 0 {
            self.marker(&format!("pulse x{count}"));
        }
    }
}

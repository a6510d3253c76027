//! Paced breathing with breath-hold rounds.

mod engine;
mod settings;

pub use engine::{BreathDirection, BreathingEngine, BreathingPhase, BreathingSnapshot};
pub use settings::{
    BreathingRoundResult, BreathingSettings, DEFAULT_BREATHS, DEFAULT_PACE_SECS,
    DEFAULT_RECOVERY_SECS, DEFAULT_ROUNDS,
};

//! Guided meditation: plans of chained sessions, the timing engine and the
//! completed-session history.

mod engine;
mod plan;
mod session;

pub use engine::{MeditationEngine, MeditationPhase, MeditationSnapshot};
pub use plan::{MeditationPlan, DEFAULT_MINUTES, MAX_MINUTES, MAX_SESSIONS, MIN_MINUTES};
pub use session::{MeditationSession, HISTORY_CAP};

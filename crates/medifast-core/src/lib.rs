//! # MediFast Core Library
//!
//! This library provides the core logic for MediFast, a personal wellness
//! timer covering guided meditation, paced breathing and intermittent
//! fasting. Every operation is reachable from the standalone `medifast` CLI;
//! any richer front end is a thin layer over the same engines.
//!
//! ## Architecture
//!
//! - **Engines**: wall-clock-driven state machines. The caller delivers
//!   `tick()` about once a second together with a foreground flag; mutating
//!   calls return the [`Event`]s they caused.
//! - **Capabilities**: the record store, cue output, clock and calendar are
//!   passed in explicitly through [`Capabilities`]; there are no globals.
//! - **Storage**: a JSON key-value [`Store`] with in-memory and SQLite
//!   backends, plus TOML-based configuration.
//! - **Statistics**: pure functions over session histories.
//!
//! ## Key Components
//!
//! - [`MeditationEngine`]: chained sessions with warm-up and interval bells
//! - [`BreathingEngine`]: breathing, retention and recovery rounds
//! - [`FastingEngine`]: active fast and completed-fast history
//! - [`ActivityStats`]: summary across all three activities
//! - [`Config`]: application configuration management

pub mod breathing;
pub mod capabilities;
pub mod clock;
pub mod cues;
pub mod error;
pub mod events;
pub mod fasting;
pub mod format;
pub mod meditation;
pub mod profile;
pub mod stats;
pub mod storage;
pub mod streak;

pub use breathing::{BreathingEngine, BreathingPhase, BreathingRoundResult, BreathingSettings};
pub use capabilities::Capabilities;
pub use clock::{Calendar, Clock, ManualClock, SystemClock, WeekStart};
pub use cues::{CueEmitter, ImpactStrength, NotifyKind, RecordingCues, SilentCues, SoundCue};
pub use error::{ConfigError, CoreError, Result, StoreError, ValidationError};
pub use events::{Activity, Event};
pub use fasting::{Fast, FastingEngine};
pub use meditation::{MeditationEngine, MeditationPhase, MeditationPlan, MeditationSession};
pub use profile::{ProfileBook, ProfileForm, UnitSystem, UserProfile};
pub use stats::{ActivityStats, HistoryFilter, TimedRecord};
pub use storage::{Config, MemoryStore, SqliteStore, Store, StoreExt};
pub use streak::StreakState;

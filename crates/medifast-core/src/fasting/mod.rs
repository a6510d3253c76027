//! Fast tracking: one optional active fast plus a newest-first history.

mod engine;
mod fast;

pub use engine::FastingEngine;
pub use fast::{Fast, HISTORY_CAP};

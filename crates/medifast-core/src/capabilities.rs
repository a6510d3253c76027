//! The external collaborators every engine is built with.

use std::rc::Rc;

use crate::clock::{Calendar, Clock, SystemClock};
use crate::cues::{CueEmitter, SilentCues};
use crate::storage::{MemoryStore, Store};

/// Store, cue output, clock and calendar injected into each engine.
///
/// Engines are single-threaded, so the handles are `Rc` and may be shared by
/// all three engines at once; each engine only touches its own store keys.
#[derive(Clone)]
pub struct Capabilities {
    pub store: Rc<dyn Store>,
    pub cues: Rc<dyn CueEmitter>,
    pub clock: Rc<dyn Clock>,
    pub calendar: Calendar,
}

impl Capabilities {
    pub fn new(
        store: Rc<dyn Store>,
        cues: Rc<dyn CueEmitter>,
        clock: Rc<dyn Clock>,
        calendar: Calendar,
    ) -> Self {
        Self {
            store,
            cues,
            clock,
            calendar,
        }
    }

    /// Memory store, no cues, system clock, local calendar.
    pub fn ephemeral() -> Self {
        Self::new(
            Rc::new(MemoryStore::new()),
            Rc::new(SilentCues),
            Rc::new(SystemClock),
            Calendar::local(),
        )
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}

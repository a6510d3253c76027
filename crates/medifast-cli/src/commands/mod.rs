pub mod breathe;
pub mod config;
pub mod fast;
pub mod meditate;
pub mod profile;
pub mod stats;

mod session;
mod terminal;

use std::rc::Rc;

use medifast_core::{Capabilities, Config, Event, SqliteStore, SystemClock};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk store and wire up terminal cues per `config`.
fn capabilities(config: &Config) -> Result<Capabilities, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    Ok(Capabilities::new(
        Rc::new(store),
        Rc::new(terminal::TerminalCues::from_config(&config.cues)),
        Rc::new(SystemClock),
        config.calendar(),
    ))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One compact JSON line per event.
fn print_events(events: &[Event]) -> CliResult {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

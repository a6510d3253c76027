//! Interactive session driver.
//!
//! A single-threaded tokio runtime merges a one-second interval with lines
//! read from stdin. Typing `pause` hands the engine background ticks until
//! `resume`; everything else goes to the session as input. Closing stdin
//! stops reading; the clock keeps running unless the session ends itself.

use std::time::Duration;

use medifast_core::Event;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::{print_events, CliResult};

pub trait Interactive {
    /// One tick from the interval.
    fn tick(&mut self, foreground: bool) -> Vec<Event>;

    /// One trimmed line of user input.
    fn input(&mut self, line: &str) -> Vec<Event>;

    /// Stdin reached EOF. Sessions that need input to progress should end here.
    fn input_closed(&mut self) -> Vec<Event> {
        Vec::new()
    }

    fn is_finished(&self) -> bool;

    /// Single-line progress display.
    fn status(&self) -> String;
}

pub fn run(session: &mut dyn Interactive) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let result = runtime.block_on(drive(session));
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}

async fn drive(session: &mut dyn Interactive) -> CliResult {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut foreground = true;

    eprintln!("{}", session.status());
    while !session.is_finished() {
        let events = tokio::select! {
            _ = ticker.tick() => session.tick(foreground),
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match line.trim() {
                    "pause" => {
                        foreground = false;
                        session.tick(foreground)
                    }
                    "resume" => {
                        foreground = true;
                        session.tick(foreground)
                    }
                    other => session.input(other),
                },
                None => {
                    tracing::debug!("stdin closed");
                    stdin_open = false;
                    session.input_closed()
                }
            },
        };
        print_events(&events)?;
        eprintln!("{}", session.status());
    }
    Ok(())
}

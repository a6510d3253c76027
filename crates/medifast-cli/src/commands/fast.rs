use chrono::Utc;
use clap::Subcommand;
use medifast_core::format::hms;
use medifast_core::{Config, FastingEngine, HistoryFilter};
use uuid::Uuid;

use super::{capabilities, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum FastAction {
    /// Start a fast now
    Start,
    /// End the running fast
    Stop,
    /// Show the running fast and elapsed time
    Status,
    /// Move the running fast's start time (negative values move it earlier)
    Adjust {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        hours: i64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        minutes: i64,
    },
    /// Remove a completed fast
    Delete {
        /// Fast ID
        id: Uuid,
    },
    /// List completed fasts as JSON
    History {
        /// Only fasts of at least this many hours (12, 16 or 20)
        #[arg(long)]
        min_hours: Option<f64>,
        /// Group by calendar week, labelled with the active filter
        #[arg(long)]
        weekly: bool,
    },
    /// Longest fast, averages and streaks
    Stats,
    /// Delete all completed fasts
    Clear,
}

pub fn run(action: FastAction) -> CliResult {
    let config = Config::load_or_default();
    let mut engine = FastingEngine::new(capabilities(&config)?);

    match action {
        FastAction::Start => {
            let events = engine.start();
            if events.is_empty() {
                eprintln!("a fast is already running");
            }
            print_events(&events)?;
        }
        FastAction::Stop => {
            let events = engine.stop();
            if events.is_empty() {
                eprintln!("no fast is running");
            }
            print_events(&events)?;
        }
        FastAction::Status => {
            let now = Utc::now();
            let elapsed = engine.live_elapsed(now);
            let status = serde_json::json!({
                "active": engine.active(),
                "elapsed_secs": elapsed,
                "elapsed": hms(elapsed),
            });
            print_json(&status)?;
        }
        FastAction::Adjust { hours, minutes } => {
            let events = engine.adjust_start(hours, minutes)?;
            print_events(&events)?;
        }
        FastAction::Delete { id } => {
            let events = engine.delete_fast(id);
            if events.is_empty() {
                return Err(format!("no fast with id {id}").into());
            }
            print_events(&events)?;
        }
        FastAction::History { min_hours, weekly } => {
            let filter = HistoryFilter::from_hours(
                min_hours.unwrap_or(config.fasting.default_filter_hours),
            );
            if weekly {
                let weeks: Vec<_> = engine
                    .weekly(filter)
                    .iter()
                    .map(|w| {
                        serde_json::json!({
                            "week": w.label(),
                            "week_start": w.week_start,
                            "fasts": w.records,
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "filter": filter.title(),
                    "weeks": weeks,
                }))?;
            } else {
                print_json(&engine.filtered(filter))?;
            }
        }
        FastAction::Stats => {
            let streaks = engine.streaks();
            let stats = serde_json::json!({
                "fasts": engine.history().len(),
                "last": engine.last_fast(),
                "longest_hours": engine.longest().map(|f| f.duration_hours()),
                "seven_day_average_hours": engine
                    .seven_day_average(Utc::now())
                    .map(|secs| secs / 3600.0),
                "current_streak": engine.current_streak(),
                "best_streak": engine.best_streak().max(streaks.best_streak),
                "last_fast_date": streaks.last_session_date,
            });
            print_json(&stats)?;
        }
        FastAction::Clear => print_events(&engine.clear_history())?,
    }
    Ok(())
}

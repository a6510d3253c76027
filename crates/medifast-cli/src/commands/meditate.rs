use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use medifast_core::format::ms;
use medifast_core::{Config, Event, MeditationEngine, MeditationPhase, MeditationPlan};
use uuid::Uuid;

use super::session::{self, Interactive};
use super::{capabilities, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum MeditateAction {
    /// Show or change the saved plan
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Run a plan in the foreground (type `q` to cancel, `pause`/`resume`)
    Run(PlanArgs),
    /// List completed sessions as JSON
    History {
        /// Group by calendar week
        #[arg(long)]
        weekly: bool,
    },
    /// Longest session, averages and streaks
    Stats,
    /// Remove a session from history
    Delete {
        /// Session ID
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Print the saved plan
    Show,
    /// Replace the saved plan
    Set(PlanArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// Session lengths in minutes, comma separated (e.g. 10,5,20)
    #[arg(long, value_delimiter = ',')]
    minutes: Vec<u32>,
    /// Warm-up before the first session, in seconds
    #[arg(long)]
    warmup: Option<u32>,
    /// Bell every N minutes into each session
    #[arg(long)]
    midpoint: Option<u32>,
    /// Vibrate after each session
    #[arg(long)]
    vibrate: bool,
    /// Ding after each session
    #[arg(long)]
    ding: bool,
}

impl PlanArgs {
    fn is_empty(&self) -> bool {
        self.minutes.is_empty()
            && self.warmup.is_none()
            && self.midpoint.is_none()
            && !self.vibrate
            && !self.ding
    }

    fn into_plan(self, default_minutes: u32) -> MeditationPlan {
        let minutes = if self.minutes.is_empty() {
            vec![default_minutes]
        } else {
            self.minutes
        };
        MeditationPlan::new(minutes, self.warmup, self.midpoint)
            .with_post_session_cues(self.vibrate, self.ding)
    }
}

pub fn run(action: MeditateAction) -> CliResult {
    let config = Config::load_or_default();
    let caps = capabilities(&config)?;
    let mut engine = MeditationEngine::new(caps).with_minute_secs(config.minute_secs());

    match action {
        MeditateAction::Plan { action } => match action {
            PlanAction::Show => print_json(engine.plan())?,
            PlanAction::Set(args) => {
                engine.set_plan(args.into_plan(config.meditation.default_minutes));
                print_json(engine.plan())?;
            }
        },
        MeditateAction::Run(args) => {
            let plan = if args.is_empty() {
                engine.plan().clone()
            } else {
                args.into_plan(config.meditation.default_minutes)
            };
            print_events(&engine.start_plan(plan))?;
            session::run(&mut MeditationRun { engine })?;
        }
        MeditateAction::History { weekly } => {
            if weekly {
                let weeks: Vec<_> = engine
                    .weekly()
                    .iter()
                    .map(|w| {
                        serde_json::json!({
                            "week": w.label(),
                            "week_start": w.week_start,
                            "sessions": w.records,
                        })
                    })
                    .collect();
                print_json(&weeks)?;
            } else {
                print_json(engine.history())?;
            }
        }
        MeditateAction::Stats => {
            let streaks = engine.streaks();
            let stats = serde_json::json!({
                "sessions": engine.history().len(),
                "total_minutes": engine.total_minutes(),
                "longest_secs": engine.longest().map(|s| s.duration_secs),
                "average_secs": engine.average_secs(None),
                "average_7d_secs": engine.average_secs(Some(Utc::now() - Duration::days(7))),
                "current_streak": streaks.current_streak,
                "best_streak": streaks.best_streak,
                "last_session_date": streaks.last_session_date,
            });
            print_json(&stats)?;
        }
        MeditateAction::Delete { id } => {
            let events = engine.delete_session(id);
            if events.is_empty() {
                return Err(format!("no session with id {id}").into());
            }
            print_events(&events)?;
        }
    }
    Ok(())
}

struct MeditationRun {
    engine: MeditationEngine,
}

impl Interactive for MeditationRun {
    fn tick(&mut self, foreground: bool) -> Vec<Event> {
        self.engine.tick(Utc::now(), foreground)
    }

    fn input(&mut self, line: &str) -> Vec<Event> {
        match line {
            "q" | "quit" | "cancel" => self.engine.cancel(),
            _ => Vec::new(),
        }
    }

    fn is_finished(&self) -> bool {
        matches!(
            self.engine.phase(),
            MeditationPhase::Idle | MeditationPhase::Completed
        )
    }

    fn status(&self) -> String {
        let remaining = ms(i64::from(self.engine.remaining_secs()));
        let percent = (self.engine.progress() * 100.0).round();
        let line = match self.engine.phase() {
            MeditationPhase::Idle => return "cancelled".to_string(),
            MeditationPhase::Completed => return "done".to_string(),
            MeditationPhase::Warmup => format!("warm-up {remaining} left"),
            MeditationPhase::Running { index } => format!(
                "session {}/{} {remaining} left ({percent}%)",
                index + 1,
                self.engine.plan().session_count()
            ),
        };
        if self.engine.is_suspended() {
            format!("{line} [paused]")
        } else {
            line
        }
    }
}

use clap::{Args, Subcommand};
use medifast_core::breathing::BreathingSnapshot;
use medifast_core::storage::keys;
use medifast_core::{BreathingEngine, BreathingPhase, BreathingSettings, Config, Event};

use super::session::{self, Interactive};
use super::{capabilities, print_events, print_json, CliResult};

#[derive(Subcommand)]
pub enum BreatheAction {
    /// Show or change the saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Run a session (Enter = breath, `d` = next step, `f` = finish)
    Run(SettingsArgs),
    /// Rounds from the most recent session
    History,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the saved settings
    Show,
    /// Change the saved settings
    Set(SettingsArgs),
}

#[derive(Args)]
pub struct SettingsArgs {
    #[arg(long)]
    rounds: Option<u32>,
    /// Breaths per round
    #[arg(long)]
    breaths: Option<u32>,
    /// Recovery hold in seconds
    #[arg(long)]
    recovery: Option<u32>,
    /// Seconds per paced breath
    #[arg(long)]
    pace: Option<u32>,
    /// Vibrate after each round
    #[arg(long)]
    vibrate: Option<bool>,
    /// Ding after each round
    #[arg(long)]
    ding: Option<bool>,
}

impl SettingsArgs {
    fn apply(self, mut base: BreathingSettings) -> BreathingSettings {
        base.rounds = self.rounds.unwrap_or(base.rounds);
        base.breaths_per_round = self.breaths.unwrap_or(base.breaths_per_round);
        base.recovery_hold_secs = self.recovery.unwrap_or(base.recovery_hold_secs);
        base.pace_secs = self.pace.unwrap_or(base.pace_secs);
        base.vibrate_after_round = self.vibrate.unwrap_or(base.vibrate_after_round);
        base.ding_after_round = self.ding.unwrap_or(base.ding_after_round);
        base.normalized()
    }
}

pub fn run(action: BreatheAction) -> CliResult {
    let config = Config::load_or_default();
    let caps = capabilities(&config)?;
    // Config defaults apply until settings have been saved once.
    let has_saved = caps.store.load(keys::BREATHING_SETTINGS)?.is_some();
    let mut engine = BreathingEngine::new(caps);
    let base = if has_saved {
        engine.settings().clone()
    } else {
        config.breathing_settings()
    };

    match action {
        BreatheAction::Settings { action } => match action {
            SettingsAction::Show => print_json(&base)?,
            SettingsAction::Set(args) => {
                engine.set_settings(args.apply(base));
                print_json(engine.settings())?;
            }
        },
        BreatheAction::Run(args) => {
            print_events(&engine.start_settings(args.apply(base)))?;
            session::run(&mut BreathingRun { engine })?;
        }
        BreatheAction::History => {
            let history = serde_json::json!({
                "rounds": engine.results(),
                "best_retention_secs": engine.best_retention_secs(),
            });
            print_json(&history)?;
        }
    }
    Ok(())
}

struct BreathingRun {
    engine: BreathingEngine,
}

impl Interactive for BreathingRun {
    fn tick(&mut self, foreground: bool) -> Vec<Event> {
        self.engine.tick(foreground)
    }

    fn input(&mut self, line: &str) -> Vec<Event> {
        match line {
            "" | "t" => self.engine.single_tap(),
            "d" => self.engine.double_tap(),
            "f" | "q" => self.engine.finish_early(),
            _ => Vec::new(),
        }
    }

    fn input_closed(&mut self) -> Vec<Event> {
        self.engine.finish_early()
    }

    fn is_finished(&self) -> bool {
        self.engine.phase() == BreathingPhase::Completed
    }

    fn status(&self) -> String {
        let BreathingSnapshot {
            phase,
            title,
            round,
            rounds,
            breath,
            display,
            ..
        } = self.engine.snapshot();
        match phase {
            BreathingPhase::Breathing => {
                format!("round {round}/{rounds} {title}: {display} ({breath:?})")
            }
            BreathingPhase::Completed => title,
            _ => format!("round {round}/{rounds} {title}: {display}"),
        }
    }
}

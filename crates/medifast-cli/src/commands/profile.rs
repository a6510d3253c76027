//! User profile commands.

use std::rc::Rc;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use medifast_core::{ProfileBook, SqliteStore, UnitSystem, UserProfile};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the saved profile with derived values
    Show,
    /// Update profile fields; unspecified fields keep their saved values
    Set {
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long)]
        family_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Weight in the chosen units (comma decimals accepted)
        #[arg(long)]
        weight: Option<String>,
        /// Height in the chosen units (comma decimals accepted)
        #[arg(long)]
        height: Option<String>,
        #[arg(long, value_enum)]
        units: Option<Units>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Units {
    Metric,
    Imperial,
}

impl From<Units> for UnitSystem {
    fn from(units: Units) -> Self {
        match units {
            Units::Metric => UnitSystem::Metric,
            Units::Imperial => UnitSystem::Imperial,
        }
    }
}

pub fn run(action: ProfileAction) -> CliResult {
    let mut book = ProfileBook::new(Rc::new(SqliteStore::open()?));

    match action {
        ProfileAction::Show => match book.profile() {
            Some(profile) => print_json(&describe(profile))?,
            None => println!("null"),
        },
        ProfileAction::Set {
            given_name,
            family_name,
            email,
            weight,
            height,
            units,
        } => {
            let mut form = book.form();
            if let Some(units) = units {
                // Convert saved numbers first so untouched fields stay correct.
                form.set_unit_system(units.into());
            }
            if let Some(v) = given_name {
                form.given_name = v;
            }
            if let Some(v) = family_name {
                form.family_name = v;
            }
            if let Some(v) = email {
                form.email = v;
            }
            if let Some(v) = weight {
                form.weight = v;
            }
            if let Some(v) = height {
                form.height = v;
            }
            let saved = book
                .save(&form, Utc::now())
                .map_err(|e| format!("{}: {e}", e.field()))?;
            print_json(&describe(saved))?;
        }
    }
    Ok(())
}

fn describe(profile: &UserProfile) -> serde_json::Value {
    serde_json::json!({
        "profile": profile,
        "full_name": profile.full_name(),
        "initials": profile.initials(),
        "weight": profile.display_weight(),
        "height": profile.display_height(),
        "bmi": profile.bmi_summary(),
    })
}

use medifast_core::{ActivityStats, Config, SqliteStore};

use super::{print_json, CliResult};

/// Print the summary across meditation, breathing and fasting.
pub fn run() -> CliResult {
    let config = Config::load_or_default();
    let store = SqliteStore::open()?;
    let stats = ActivityStats::load(&store, &config.calendar());
    print_json(&stats)
}

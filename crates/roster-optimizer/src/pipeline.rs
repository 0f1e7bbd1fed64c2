// One optimisation run: load -> derive -> solve -> format.

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::data::players::{load_players, PlayerTable};
use crate::data::LoadError;
use crate::optimizer::{self, Selection, SolveError};
use crate::report;
use crate::valuation;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Derive values and solve for an already loaded table (blocking, no time limit).
pub fn select_roster(table: &PlayerTable, config: &Config) -> Result<Selection, SolveError> {
    let valued = valuation::derive(&table.players, &config.scoring);
    optimizer::optimize(&valued, &config.roster)
}

/// Run the whole pipeline for `input` and return the rendered report.
///
/// Nothing is printed here; on error no report exists.
pub async fn run(input: &Path, config: &Config) -> Result<String, RunError> {
    info!("reading players from {}", input.display());
    let table = load_players(input)?;

    let valued = valuation::derive(&table.players, &config.scoring);
    let selection = optimizer::optimize_within(
        valued,
        config.roster.clone(),
        config.solver.time_limit(),
    )
    .await?;

    Ok(report::format_report(&selection))
}

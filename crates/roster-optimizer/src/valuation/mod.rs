// Valuation: derive per-game rates and objective values from player records.

pub mod ppg;

use tracing::debug;

use crate::config::ScoringConfig;
use crate::data::players::PlayerRecord;

/// A player record with its derived scoring values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuedPlayer {
    pub record: PlayerRecord,
    pub ppg: f64,
    pub objective: f64,
}

/// Derive `ppg` and `objective` for every record, preserving order.
pub fn derive(records: &[PlayerRecord], scoring: &ScoringConfig) -> Vec<ValuedPlayer> {
    let valued: Vec<ValuedPlayer> = records
        .iter()
        .map(|record| {
            let ppg = ppg::points_per_game(record, scoring);
            let objective = ppg::objective_value(record.pgp, ppg, scoring);
            ValuedPlayer {
                record: record.clone(),
                ppg,
                objective,
            }
        })
        .collect();

    let projected = records.iter().filter(|r| r.projection.is_some()).count();
    debug!(
        "derived values for {} players ({} from projections, {} from pgp fallback)",
        valued.len(),
        projected,
        valued.len() - projected
    );
    valued
}

// Points-per-game estimate and the weighted objective built on top of it.

use crate::config::ScoringConfig;
use crate::data::players::PlayerRecord;

/// Per-game scoring rate for one player.
///
/// - With a season projection: `projection / games_per_season`
/// - Without one: `pgp_fallback_factor * pgp`
///
/// NaN inputs produce NaN; nothing is trapped here.
pub fn points_per_game(record: &PlayerRecord, scoring: &ScoringConfig) -> f64 {
    match record.projection {
        Some(points) => points / scoring.games_per_season,
        None => scoring.pgp_fallback_factor * record.pgp,
    }
}

/// Weighted sum of the prior rate and the estimated rate.
///
/// With the stock weights (`pgp` 0.0, `ppg` 1.0) this equals `ppg` exactly
/// for any finite `pgp`.
pub fn objective_value(pgp: f64, ppg: f64, scoring: &ScoringConfig) -> f64 {
    scoring.pgp_weight * pgp + scoring.ppg_weight * ppg
}

// Plain-text roster report: forwards, defensemen, then selection totals.

use crate::data::players::Role;
use crate::optimizer::Selection;
use crate::valuation::ValuedPlayer;

/// Sums over the whole selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub objective: f64,
    pub pgp: f64,
    pub ppg: f64,
    pub cost: f64,
}

pub fn totals(selection: &Selection) -> Totals {
    selection
        .players
        .iter()
        .fold(Totals::default(), |acc, p| Totals {
            objective: acc.objective + p.objective,
            pgp: acc.pgp + p.record.pgp,
            ppg: acc.ppg + p.ppg,
            cost: acc.cost + p.record.cost,
        })
}

/// Players of one role, highest objective first. Equal objectives keep
/// selection (input row) order.
pub fn ranked(selection: &Selection, role: Role) -> Vec<&ValuedPlayer> {
    let mut group: Vec<&ValuedPlayer> = selection
        .players
        .iter()
        .filter(|p| p.record.position.role() == Some(role))
        .collect();
    group.sort_by(|a, b| b.objective.total_cmp(&a.objective));
    group
}

pub fn format_player(player: &ValuedPlayer) -> String {
    format!(
        "{} ({}): money ${:.2}, pgp: {:.2}, ppg: {:.2}, objective: {:.2}",
        player.record.name,
        player.record.position,
        player.record.cost,
        player.record.pgp,
        player.ppg,
        player.objective
    )
}

/// Render the full report. No trailing newline.
pub fn format_report(selection: &Selection) -> String {
    let section = |role| {
        ranked(selection, role)
            .into_iter()
            .map(format_player)
            .collect::<Vec<_>>()
            .join("\n")
    };
    let t = totals(selection);

    let mut out = String::from("Forwards:\n");
    out.push_str(&section(Role::Forward));
    out.push_str("\n\nDefensemen:\n");
    out.push_str(&section(Role::Defense));
    out.push_str(&format!("\n\nTotal Objective Value: {:.2}", t.objective));
    out.push_str(&format!("\nTotal PGP: {:.2}", t.pgp));
    out.push_str(&format!("\nTotal PPG: {:.2}", t.ppg));
    out.push_str(&format!("\nTotal Cost: ${:.2} million", t.cost));
    out
}

// Roster selection as a 0/1 integer linear program.
//
// One binary variable per eligible player; maximise the summed objective
// subject to a budget cap and exact forward/defense counts. The engine is
// good_lp's default solver.

use std::fmt;
use std::time::Duration;

use good_lp::{
    default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RosterRules;
use crate::data::players::Role;
use crate::valuation::ValuedPlayer;

/// Slack allowed when re-checking the budget on an extracted solution.
const BUDGET_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A constraint that cannot be met, as far as can be told before solving.
#[derive(Debug, Clone, PartialEq)]
pub enum InfeasibleReason {
    /// Fewer eligible players of a role than its quota.
    InsufficientPlayers {
        role: Role,
        eligible: usize,
        required: usize,
    },
    /// Even the cheapest players filling every quota exceed the budget.
    BudgetExceeded { minimum_cost: f64, budget_cap: f64 },
    /// The solver proved infeasibility without a more specific cause.
    SolverReported,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibleReason::InsufficientPlayers {
                role,
                eligible,
                required,
            } => write!(
                f,
                "{} quota needs {} players but only {} are eligible",
                role_label(*role),
                required,
                eligible
            ),
            InfeasibleReason::BudgetExceeded {
                minimum_cost,
                budget_cap,
            } => write!(
                f,
                "budget cap {budget_cap:.2} is below the cheapest full roster cost {minimum_cost:.2}"
            ),
            InfeasibleReason::SolverReported => {
                write!(f, "budget and quota constraints cannot all be met")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid objective: player '{name}' (row {row}) has a non-numeric {field}")]
    InvalidObjective {
        row: usize,
        name: String,
        field: &'static str,
    },

    #[error("infeasible roster: {}", join_reasons(.reasons))]
    Infeasible { reasons: Vec<InfeasibleReason> },

    #[error("solver timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("solver failed: {0}")]
    Solver(String),
}

fn join_reasons(reasons: &[InfeasibleReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Forward => "forward",
        Role::Defense => "defense",
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The chosen players, in input row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub players: Vec<ValuedPlayer>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.players
            .iter()
            .filter(|p| p.record.position.role() == Some(role))
            .count()
    }

    pub fn total_cost(&self) -> f64 {
        self.players.iter().map(|p| p.record.cost).sum()
    }

    pub fn total_objective(&self) -> f64 {
        self.players.iter().map(|p| p.objective).sum()
    }
}

// ---------------------------------------------------------------------------
// Pre-solve checks
// ---------------------------------------------------------------------------

/// Index into the player slice plus the bucket it counts against.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    role: Role,
}

fn candidates(players: &[ValuedPlayer]) -> Vec<Candidate> {
    players
        .iter()
        .enumerate()
        .filter_map(|(index, p)| p.record.position.role().map(|role| Candidate { index, role }))
        .collect()
}

/// Reject candidates whose objective or cost coefficient is not a finite number.
fn check_coefficients(
    players: &[ValuedPlayer],
    candidates: &[Candidate],
) -> Result<(), SolveError> {
    for c in candidates {
        let p = &players[c.index];
        let field = if !p.objective.is_finite() {
            "objective"
        } else if !p.record.cost.is_finite() {
            "cost"
        } else {
            continue;
        };
        return Err(SolveError::InvalidObjective {
            row: p.record.row,
            name: p.record.name.clone(),
            field,
        });
    }
    Ok(())
}

/// Every reason the roster rules cannot be satisfied by `players`.
///
/// The constraints separate by role, so the quota counts plus the cheapest
/// quota-sized subsets decide feasibility exactly.
pub fn check_feasibility(
    players: &[ValuedPlayer],
    rules: &RosterRules,
) -> Vec<InfeasibleReason> {
    let cands = candidates(players);
    let mut reasons = Vec::new();
    let mut minimum_cost = 0.0;

    for (role, required) in [(Role::Forward, rules.forwards), (Role::Defense, rules.defensemen)] {
        let mut costs: Vec<f64> = cands
            .iter()
            .filter(|c| c.role == role)
            .map(|c| players[c.index].record.cost)
            .collect();

        if costs.len() < required {
            reasons.push(InfeasibleReason::InsufficientPlayers {
                role,
                eligible: costs.len(),
                required,
            });
            continue;
        }

        costs.sort_by(f64::total_cmp);
        minimum_cost += costs.iter().take(required).sum::<f64>();
    }

    if reasons.is_empty() && minimum_cost > rules.budget_cap + BUDGET_TOLERANCE {
        reasons.push(InfeasibleReason::BudgetExceeded {
            minimum_cost,
            budget_cap: rules.budget_cap,
        });
    }

    reasons
}

// ---------------------------------------------------------------------------
// Solve
// ---------------------------------------------------------------------------

/// Choose the roster maximising the summed objective under `rules`.
///
/// Players without a forward/defense role get no decision variable. Ties
/// between equally valued rosters are broken by the solver.
pub fn optimize(players: &[ValuedPlayer], rules: &RosterRules) -> Result<Selection, SolveError> {
    let cands = candidates(players);
    check_coefficients(players, &cands)?;

    let reasons = check_feasibility(players, rules);
    if !reasons.is_empty() {
        return Err(SolveError::Infeasible { reasons });
    }

    info!(
        "solving roster model: {} candidates ({} ineligible), budget {:.2}, {} F / {} D",
        cands.len(),
        players.len() - cands.len(),
        rules.budget_cap,
        rules.forwards,
        rules.defensemen
    );

    if rules.forwards + rules.defensemen == 0 {
        return Ok(Selection::default());
    }

    let mut vars = variables!();
    let picks: Vec<Variable> = cands.iter().map(|_| vars.add(variable().binary())).collect();

    let mut objective = Expression::with_capacity(cands.len());
    let mut spend = Expression::with_capacity(cands.len());
    let mut forwards = Expression::default();
    let mut defense = Expression::default();
    let (mut forward_vars, mut defense_vars) = (0usize, 0usize);

    for (c, &x) in cands.iter().zip(&picks) {
        let p = &players[c.index];
        objective.add_mul(p.objective, x);
        spend.add_mul(p.record.cost, x);
        match c.role {
            Role::Forward => {
                forwards.add_mul(1.0, x);
                forward_vars += 1;
            }
            Role::Defense => {
                defense.add_mul(1.0, x);
                defense_vars += 1;
            }
        }
    }

    let mut problem = vars
        .maximise(objective)
        .using(default_solver)
        .with(spend.leq(rules.budget_cap));
    // A role with no candidates has a zero quota here (checked above), so
    // its row would be the constant 0 == 0.
    if forward_vars > 0 {
        problem = problem.with(forwards.eq(rules.forwards as f64));
    }
    if defense_vars > 0 {
        problem = problem.with(defense.eq(rules.defensemen as f64));
    }

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => {
            return Err(SolveError::Infeasible {
                reasons: vec![InfeasibleReason::SolverReported],
            })
        }
        Err(ResolutionError::Unbounded) => {
            return Err(SolveError::Solver("model reported unbounded".into()))
        }
        Err(e) => return Err(SolveError::Solver(e.to_string())),
    };

    let selection = Selection {
        players: cands
            .iter()
            .zip(&picks)
            .filter(|(_, x)| solution.value(**x) > 0.5)
            .map(|(c, _)| players[c.index].clone())
            .collect(),
    };

    verify(&selection, rules)?;

    info!(
        "selected {} players, objective {:.4}, cost {:.2}",
        selection.len(),
        selection.total_objective(),
        selection.total_cost()
    );
    Ok(selection)
}

/// Re-check the extracted selection against every constraint.
fn verify(selection: &Selection, rules: &RosterRules) -> Result<(), SolveError> {
    let forwards = selection.count_role(Role::Forward);
    let defense = selection.count_role(Role::Defense);
    let cost = selection.total_cost();

    if forwards != rules.forwards || defense != rules.defensemen {
        warn!(
            "solver returned {} F / {} D, expected {} F / {} D",
            forwards, defense, rules.forwards, rules.defensemen
        );
        return Err(SolveError::Solver(format!(
            "solution has {forwards} forwards and {defense} defensemen, expected {} and {}",
            rules.forwards, rules.defensemen
        )));
    }
    if cost > rules.budget_cap + BUDGET_TOLERANCE {
        return Err(SolveError::Solver(format!(
            "solution cost {cost:.4} exceeds budget cap {:.4}",
            rules.budget_cap
        )));
    }
    Ok(())
}

/// `optimize` on the blocking pool, abandoned after `limit` if one is set.
pub async fn optimize_within(
    players: Vec<ValuedPlayer>,
    rules: RosterRules,
    limit: Option<Duration>,
) -> Result<Selection, SolveError> {
    run_with_limit(move || optimize(&players, &rules), limit).await
}

/// Run a blocking solve job, mapping an elapsed `limit` to `SolveError::Timeout`.
///
/// The job thread is not interrupted on timeout; its result is discarded.
pub(crate) async fn run_with_limit<F, T>(job: F, limit: Option<Duration>) -> Result<T, SolveError>
where
    F: FnOnce() -> Result<T, SolveError> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);
    let joined = match limit {
        Some(limit) => {
            debug!("solver time limit {:?}", limit);
            tokio::time::timeout(limit, handle)
                .await
                .map_err(|_| SolveError::Timeout(limit))?
        }
        None => handle.await,
    };
    joined.map_err(|e| SolveError::Solver(format!("solver task failed: {e}")))?
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::players::{PlayerRecord, Position};

    fn player(row: usize, pos: &str, cost: f64, ppg: f64) -> ValuedPlayer {
        ValuedPlayer {
            record: PlayerRecord {
                row,
                name: format!("Player {row}"),
                position: Position::from_str_pos(pos),
                cost,
                pgp: ppg / 0.9,
                projection: None,
            },
            ppg,
            objective: ppg,
        }
    }

    fn small_rules(budget_cap: f64, forwards: usize, defensemen: usize) -> RosterRules {
        RosterRules {
            budget_cap,
            forwards,
            defensemen,
        }
    }

    fn rows(selection: &Selection) -> Vec<usize> {
        selection.players.iter().map(|p| p.record.row).collect()
    }

    /// 25 forwards and 10 defensemen with distinct values and cost 1 each.
    fn league_pool() -> Vec<ValuedPlayer> {
        let mut players = Vec::new();
        for i in 0..25 {
            let pos = ["L", "C", "R"][i % 3];
            players.push(player(i, pos, 1.0, 0.30 + 0.02 * i as f64));
        }
        for i in 0..10 {
            players.push(player(25 + i, "D", 1.0, 0.20 + 0.03 * i as f64));
        }
        players
    }

    #[test]
    fn picks_top_values_with_headroom() {
        let players = league_pool();
        let selection = optimize(&players, &RosterRules::default()).unwrap();

        assert_eq!(selection.count_role(Role::Forward), 13);
        assert_eq!(selection.count_role(Role::Defense), 8);
        assert!(selection.total_cost() <= 82.0);

        let mut expected: Vec<usize> = (12..25).collect();
        expected.extend(27..35);
        assert_eq!(rows(&selection), expected);
    }

    #[test]
    fn budget_forces_cheaper_roster() {
        // 2 F + 1 D under a cap of 10. The star forward (cost 8) only fits
        // alongside the two worst cheap players.
        let players = vec![
            player(0, "C", 8.0, 1.0),
            player(1, "L", 3.0, 0.9),
            player(2, "R", 3.0, 0.8),
            player(3, "L", 1.0, 0.1),
            player(4, "D", 3.0, 0.5),
            player(5, "D", 1.0, 0.4),
        ];
        let selection = optimize(&players, &small_rules(10.0, 2, 1)).unwrap();
        assert_eq!(rows(&selection), vec![1, 2, 4]);
        assert!((selection.total_objective() - 2.2).abs() < 1e-9);
        assert!(selection.total_cost() <= 10.0);
    }

    #[test]
    fn ineligible_players_never_selected() {
        let players = vec![
            player(0, "G", 0.0, 5.0),
            player(1, "C", 1.0, 0.5),
            player(2, "D", 1.0, 0.4),
            player(3, "LW", 0.0, 9.0),
        ];
        let selection = optimize(&players, &small_rules(5.0, 1, 1)).unwrap();
        assert_eq!(rows(&selection), vec![1, 2]);
    }

    #[test]
    fn ineligible_nan_rows_are_ignored() {
        let players = vec![
            player(0, "G", f64::NAN, f64::NAN),
            player(1, "C", 1.0, 0.5),
            player(2, "D", 1.0, 0.4),
        ];
        assert!(optimize(&players, &small_rules(5.0, 1, 1)).is_ok());
    }

    #[test]
    fn nan_objective_rejected_before_solve() {
        let players = vec![
            player(0, "C", 1.0, 0.5),
            player(1, "D", 1.0, f64::NAN),
        ];
        let err = optimize(&players, &small_rules(5.0, 1, 1)).unwrap_err();
        match err {
            SolveError::InvalidObjective { row, field, .. } => {
                assert_eq!(row, 1);
                assert_eq!(field, "objective");
            }
            other => panic!("expected InvalidObjective, got {other:?}"),
        }
    }

    #[test]
    fn nan_cost_rejected_before_solve() {
        let players = vec![player(0, "C", f64::NAN, 0.5), player(1, "D", 1.0, 0.4)];
        let err = optimize(&players, &small_rules(5.0, 1, 1)).unwrap_err();
        assert!(matches!(err, SolveError::InvalidObjective { field: "cost", .. }));
    }

    #[test]
    fn too_few_forwards_is_infeasible() {
        let players: Vec<ValuedPlayer> = league_pool()
            .into_iter()
            .filter(|p| p.record.row >= 15)
            .collect();
        let err = optimize(&players, &RosterRules::default()).unwrap_err();
        match err {
            SolveError::Infeasible { reasons } => assert_eq!(
                reasons,
                vec![InfeasibleReason::InsufficientPlayers {
                    role: Role::Forward,
                    eligible: 10,
                    required: 13,
                }]
            ),
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn both_quotas_reported() {
        let players = vec![player(0, "C", 1.0, 0.5)];
        let reasons = check_feasibility(&players, &small_rules(10.0, 2, 1));
        assert_eq!(reasons.len(), 2);
        assert!(reasons.iter().all(|r| matches!(r, InfeasibleReason::InsufficientPlayers { .. })));
    }

    #[test]
    fn over_budget_is_infeasible() {
        let players = vec![
            player(0, "C", 6.0, 0.5),
            player(1, "R", 7.0, 0.4),
            player(2, "D", 5.0, 0.3),
        ];
        let err = optimize(&players, &small_rules(10.0, 1, 1)).unwrap_err();
        match err {
            SolveError::Infeasible { reasons } => assert_eq!(
                reasons,
                vec![InfeasibleReason::BudgetExceeded {
                    minimum_cost: 11.0,
                    budget_cap: 10.0,
                }]
            ),
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn cheapest_roster_exactly_at_cap_is_feasible() {
        let players = vec![
            player(0, "C", 6.0, 0.5),
            player(1, "R", 5.0, 0.4),
            player(2, "D", 4.0, 0.3),
        ];
        assert!(check_feasibility(&players, &small_rules(9.0, 1, 1)).is_empty());
        let selection = optimize(&players, &small_rules(9.0, 1, 1)).unwrap();
        assert_eq!(rows(&selection), vec![1, 2]);
    }

    #[test]
    fn infeasible_message_names_constraint() {
        let err = SolveError::Infeasible {
            reasons: vec![InfeasibleReason::InsufficientPlayers {
                role: Role::Defense,
                eligible: 3,
                required: 8,
            }],
        };
        assert_eq!(
            err.to_string(),
            "infeasible roster: defense quota needs 8 players but only 3 are eligible"
        );
    }

    #[test]
    fn zero_quota_role_allowed() {
        let players = vec![player(0, "C", 1.0, 0.5), player(1, "R", 1.0, 0.6)];
        let selection = optimize(&players, &small_rules(1.0, 1, 0)).unwrap();
        assert_eq!(rows(&selection), vec![1]);
    }

    #[test]
    fn repeated_solves_agree_on_objective() {
        // Many exact ties: identical values across forwards.
        let mut players: Vec<ValuedPlayer> = (0..20).map(|i| player(i, "C", 1.0, 0.5)).collect();
        players.extend((20..30).map(|i| player(i, "D", 1.0, 0.25)));

        let first = optimize(&players, &RosterRules::default()).unwrap();
        let second = optimize(&players, &RosterRules::default()).unwrap();
        assert!((first.total_objective() - second.total_objective()).abs() < 1e-9);
        assert!((first.total_objective() - (13.0 * 0.5 + 8.0 * 0.25)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn optimize_within_limit_succeeds() {
        let limit = Some(Duration::from_secs(30));
        let selection = optimize_within(league_pool(), RosterRules::default(), limit)
            .await
            .unwrap();
        assert_eq!(selection.len(), 21);
    }

    #[tokio::test]
    async fn slow_job_times_out() {
        let limit = Duration::from_millis(20);
        let result = run_with_limit(
            || {
                std::thread::sleep(Duration::from_millis(300));
                Ok(())
            },
            Some(limit),
        )
        .await;
        assert!(matches!(result, Err(SolveError::Timeout(d)) if d == limit));
    }

    #[tokio::test]
    async fn job_errors_pass_through() {
        let result: Result<(), SolveError> =
            run_with_limit(|| Err(SolveError::Solver("boom".into())), None).await;
        assert!(matches!(result, Err(SolveError::Solver(msg)) if msg == "boom"));
    }
}

//! Decomposition loop tests driven by scripted solver doubles.

use std::sync::Arc;
use std::time::Duration;

use gdploa::application::{
    LoaCallbacks, LoaConfig, LoaSolver, MasterSolveEvent, SubproblemSolveEvent,
};
use gdploa::domain::{Assignment, LoaResult, Termination, TerminationState, VarId};
use gdploa::error::Component;
use gdploa::port::{MilpStatus, NlpStatus};
use gdploa::testkit::problem::{exactly_one, single_choice};
use gdploa::testkit::solver::{ScriptedMilpSolver, ScriptedNlpSolver};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn solver(config: LoaConfig, milp: ScriptedMilpSolver, nlp: ScriptedNlpSolver) -> LoaSolver {
    LoaSolver::new(config, Arc::new(milp), Arc::new(nlp)).expect("valid config")
}

/// Assignment over `exactly_one(n)` selecting disjunct `selected`.
fn select(n: usize, selected: usize) -> Assignment {
    (0..n).map(|i| (VarId::new(i + 1), i == selected)).collect()
}

/// Master values over `exactly_one(n)`: `z` then one-hot indicators.
fn one_hot(n: usize, z: f64, selected: usize) -> Vec<f64> {
    std::iter::once(z)
        .chain((0..n).map(|i| if i == selected { 1.0 } else { 0.0 }))
        .collect()
}

fn y_selected() -> Assignment {
    [(VarId::new(1), true)].into_iter().collect()
}

fn error_component(result: &LoaResult) -> Component {
    match &result.termination {
        Termination::Error { component, .. } => *component,
        other => panic!("expected an error termination, got {other}"),
    }
}

#[derive(Default)]
struct Recorder {
    master_bounds: Vec<f64>,
    master_statuses: Vec<MilpStatus>,
    fixed_after_subproblem: Vec<usize>,
    incumbents: Vec<Option<f64>>,
}

impl LoaCallbacks for Recorder {
    fn after_master_solve(&mut self, event: &MasterSolveEvent<'_>) {
        self.master_bounds.push(event.best_bound);
        self.master_statuses.push(event.result.status);
    }

    fn after_subproblem_solve(&mut self, event: &SubproblemSolveEvent<'_>) {
        self.fixed_after_subproblem.push(event.model.num_fixed());
        self.incumbents.push(event.incumbent.map(|i| i.objective));
    }
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

#[test]
fn converges_when_first_bound_matches_incumbent() {
    let (master, sub) = single_choice(3.0);
    let milp = ScriptedMilpSolver::new().optimal(3.0, vec![3.0, 1.0]);
    let nlp = ScriptedNlpSolver::new().feasible(&y_selected(), 3.0, vec![3.0, 1.0]);

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::Converged);
    assert_eq!(result.objective(), Some(3.0));
    assert_eq!(result.values(), Some(&[3.0, 1.0][..]));
    assert_eq!(result.best_bound, 3.0);
    assert_eq!(result.counters.master_iteration, 1);
    assert_eq!(result.counters.mip_iteration, 1);
    assert_eq!(result.counters.nlp_iteration, 1);
    assert_eq!(result.integer_cuts, 1);
    assert_eq!(result.oa_cuts, 0);
}

#[test]
fn exhausted_master_closes_the_gap() {
    let (master, sub) = single_choice(3.0);
    // Second call runs off the script and reports infeasible.
    let milp = ScriptedMilpSolver::new().optimal(2.0, vec![2.0, 1.0]);
    let nlp = ScriptedNlpSolver::new().feasible(&y_selected(), 3.0, vec![3.0, 1.0]);

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::Converged);
    assert_eq!(result.objective(), Some(3.0));
    assert_eq!(result.best_bound, 3.0);
    assert_eq!(result.counters.master_iteration, 1);
    assert_eq!(result.counters.mip_iteration, 2);
    assert_eq!(result.counters.nlp_iteration, 1);
}

#[test]
fn keeps_the_best_of_several_feasible_assignments() {
    let n = 3;
    let (master, sub) = exactly_one(n);
    let milp = ScriptedMilpSolver::new()
        .optimal(1.0, one_hot(n, 1.0, 0))
        .optimal(2.0, one_hot(n, 2.0, 1))
        .optimal(3.0, one_hot(n, 3.0, 2));
    let nlp = ScriptedNlpSolver::new()
        .feasible(&select(n, 0), 9.0, one_hot(n, 9.0, 0))
        .feasible(&select(n, 1), 4.0, one_hot(n, 4.0, 1))
        .feasible(&select(n, 2), 7.0, one_hot(n, 7.0, 2));

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::Converged);
    assert_eq!(result.objective(), Some(4.0));
    assert_eq!(result.incumbent.as_ref().unwrap().iteration, 2);
    assert_eq!(result.best_bound, 4.0);
    assert_eq!(result.counters.master_iteration, 3);
}

// ---------------------------------------------------------------------------
// Infeasibility and limits
// ---------------------------------------------------------------------------

#[test]
fn every_assignment_infeasible_reports_infeasible() {
    let n = 3;
    let (master, sub) = exactly_one(n);
    let milp = ScriptedMilpSolver::new()
        .optimal(0.0, one_hot(n, 0.0, 0))
        .optimal(0.0, one_hot(n, 0.0, 1))
        .optimal(0.0, one_hot(n, 0.0, 2));
    let nlp = ScriptedNlpSolver::new();
    let calls = nlp.call_log();

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::Infeasible);
    assert!(result.incumbent.is_none());
    assert_eq!(result.counters.master_iteration, 3);
    assert_eq!(result.counters.mip_iteration, 4);
    assert_eq!(result.counters.nlp_iteration, 3);
    assert_eq!(result.integer_cuts, 3);

    let seen = calls.lock().unwrap().clone();
    assert_eq!(seen, vec![select(n, 0), select(n, 1), select(n, 2)]);
}

#[test]
fn iteration_limit_stops_after_first_subproblem() {
    let n = 3;
    let (master, sub) = exactly_one(n);
    let milp = ScriptedMilpSolver::new()
        .optimal(0.0, one_hot(n, 0.0, 0))
        .optimal(0.0, one_hot(n, 0.0, 1));
    let config = LoaConfig {
        iteration_limit: 1,
        ..LoaConfig::default()
    };

    let result = solver(config, milp, ScriptedNlpSolver::new())
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.termination, Termination::IterationLimit { iteration: 1 });
    assert_eq!(result.counters.mip_iteration, 1);
    assert_eq!(result.counters.nlp_iteration, 1);
}

#[test]
fn non_optimal_nlp_status_is_treated_as_infeasible() {
    let n = 2;
    let (master, sub) = exactly_one(n);
    let milp = ScriptedMilpSolver::new()
        .optimal(0.0, one_hot(n, 0.0, 0))
        .optimal(0.0, one_hot(n, 0.0, 1));
    let nlp = ScriptedNlpSolver::new()
        .status(&select(n, 0), NlpStatus::Limit)
        .feasible(&select(n, 1), 5.0, one_hot(n, 5.0, 1));

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::Converged);
    assert_eq!(result.objective(), Some(5.0));
    assert_eq!(result.counters.nlp_iteration, 2);
}

#[test]
fn master_stopped_on_limit_ends_without_tightening_bound() {
    let n = 2;
    let (master, sub) = exactly_one(n);
    // The unproven point matches the incumbent; it must not close the gap.
    let milp = ScriptedMilpSolver::new()
        .optimal(1.0, one_hot(n, 1.0, 0))
        .limited(4.0, one_hot(n, 4.0, 1));
    let nlp = ScriptedNlpSolver::new().feasible(&select(n, 0), 4.0, one_hot(n, 4.0, 0));
    let calls = nlp.call_log();

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::TimeLimit);
    assert_eq!(result.termination.iteration(), 1);
    assert_eq!(result.objective(), Some(4.0));
    assert_eq!(result.best_bound, 1.0);
    assert_eq!(result.counters.master_iteration, 1);
    assert_eq!(result.counters.mip_iteration, 2);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn master_failing_after_budget_expires_is_a_time_limit() {
    let (master, sub) = single_choice(3.0);
    let milp = ScriptedMilpSolver::new().status_after(Duration::from_millis(50), MilpStatus::Error);
    let config = LoaConfig {
        time_limit: Some(0.01),
        ..LoaConfig::default()
    };

    let result = solver(config, milp, ScriptedNlpSolver::new())
        .solve(master, sub)
        .unwrap();

    assert_eq!(result.state(), TerminationState::TimeLimit);
    assert_eq!(result.termination.iteration(), 0);
    assert!(result.incumbent.is_none());
    assert_eq!(result.counters.nlp_iteration, 0);
}

#[test]
fn master_error_within_budget_is_still_an_error() {
    let (master, sub) = single_choice(3.0);
    let milp = ScriptedMilpSolver::new().status(MilpStatus::Error);
    let config = LoaConfig {
        time_limit: Some(600.0),
        ..LoaConfig::default()
    };

    let result = solver(config, milp, ScriptedNlpSolver::new())
        .solve(master, sub)
        .unwrap();

    assert_eq!(error_component(&result), Component::MasterProblem);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn repeated_assignment_is_a_master_error() {
    let n = 2;
    let (master, sub) = exactly_one(n);
    let milp = ScriptedMilpSolver::new()
        .optimal(0.0, one_hot(n, 0.0, 0))
        .optimal(0.0, one_hot(n, 0.0, 0));

    let result = solver(LoaConfig::default(), milp, ScriptedNlpSolver::new())
        .solve(master, sub)
        .unwrap();

    assert_eq!(error_component(&result), Component::MasterProblem);
    assert_eq!(result.termination.iteration(), 2);
    assert_eq!(result.counters.nlp_iteration, 1);
}

#[test]
fn nlp_adapter_failure_is_a_subproblem_error() {
    let (master, sub) = single_choice(3.0);
    let milp = ScriptedMilpSolver::new().optimal(2.0, vec![2.0, 1.0]);
    let nlp = ScriptedNlpSolver::new().failing(&y_selected(), "restoration failed");

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve(master, sub)
        .unwrap();

    assert_eq!(error_component(&result), Component::Subproblem);
    assert_eq!(result.termination.iteration(), 1);
    assert!(result.termination.to_string().contains("restoration failed"));
    assert!(result.incumbent.is_none());
}

#[test]
fn milp_adapter_failure_is_a_master_error() {
    let (master, sub) = single_choice(3.0);
    let milp = ScriptedMilpSolver::new().failing("license expired");

    let result = solver(LoaConfig::default(), milp, ScriptedNlpSolver::new())
        .solve(master, sub)
        .unwrap();

    assert_eq!(error_component(&result), Component::MasterProblem);
    assert_eq!(result.termination.iteration(), 0);
    assert_eq!(result.counters.nlp_iteration, 0);
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

#[test]
fn callbacks_observe_every_solve() {
    let n = 3;
    let (master, sub) = exactly_one(n);
    let milp = ScriptedMilpSolver::new()
        .optimal(1.0, one_hot(n, 1.0, 0))
        .optimal(2.0, one_hot(n, 2.0, 1))
        .optimal(3.0, one_hot(n, 3.0, 2));
    let nlp = ScriptedNlpSolver::new().feasible(&select(n, 1), 4.0, one_hot(n, 4.0, 1));
    let mut recorder = Recorder::default();

    let result = solver(LoaConfig::default(), milp, nlp)
        .solve_with_callbacks(master, sub, &mut recorder)
        .unwrap();

    assert_eq!(result.state(), TerminationState::Converged);
    assert_eq!(result.best_bound, 4.0);

    assert_eq!(recorder.master_bounds, vec![1.0, 2.0, 3.0, 3.0]);
    assert!(recorder.master_bounds.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(
        recorder.master_statuses,
        vec![
            MilpStatus::Optimal,
            MilpStatus::Optimal,
            MilpStatus::Optimal,
            MilpStatus::Infeasible,
        ]
    );
    assert_eq!(recorder.fixed_after_subproblem, vec![0, 0, 0]);
    assert_eq!(recorder.incumbents, vec![None, Some(4.0), Some(4.0)]);
}

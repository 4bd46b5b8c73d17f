//! Master problem manager.
//!
//! Owns the MILP master model for the whole run. Each iteration it installs
//! a freshly penalized objective, asks the MILP adapter for a solution,
//! extracts the discrete assignment, and afterwards absorbs the cuts the
//! subproblem produced. Cuts are append-only.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::objective::{install_augmented_objective, AugmentedObjective};
use crate::domain::{
    Assignment, ConstraintId, Cut, CutDirection, CutScope, LinearConstraint, MasterModel, OaCut,
    ProblemSnapshot, Sense, VarId, Variable, VariableBounds,
};
use crate::error::{ModelError, SolverError};
use crate::port::{MilpSolver, MilpStatus, SolveOptions};

/// Tuning knobs of the master manager, taken from [`LoaConfig`](super::LoaConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterSettings {
    pub penalty_factor: f64,
    pub oa_slacks: bool,
    pub big_m: f64,
    pub integer_tolerance: f64,
}

/// Outcome of one master solve.
#[derive(Debug, Clone, Serialize)]
pub struct MasterSolveResult {
    pub status: MilpStatus,
    /// Penalized objective value; NaN unless optimal.
    pub objective: f64,
    /// Original objective at the master point; NaN unless optimal.
    pub original_objective: f64,
    /// Discrete assignment proposed by the master; `None` unless optimal.
    pub assignment: Option<Assignment>,
    /// Master point, slacks included; empty unless optimal.
    pub values: Vec<f64>,
}

/// What [`MasterProblemManager::add_cut`] did with a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutInsertion {
    Added(ConstraintId),
    /// Integer cut for an assignment that was already excluded.
    Skipped,
}

pub struct MasterProblemManager {
    model: MasterModel,
    snapshot: ProblemSnapshot,
    settings: MasterSettings,
    /// Binary variables shared with the subproblem.
    discrete: Vec<VarId>,
    slacks: Vec<VarId>,
    cuts: Vec<Cut>,
    explored: HashSet<Assignment>,
    objective: Option<AugmentedObjective>,
    current_objective_value: Option<f64>,
    best_bound: f64,
}

impl MasterProblemManager {
    /// Take ownership of the master model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoActiveObjective`] if the model has no objective
    /// to optimize.
    pub fn new(
        model: MasterModel,
        discrete: Vec<VarId>,
        settings: MasterSettings,
    ) -> Result<Self, ModelError> {
        let snapshot = ProblemSnapshot::capture(&model)?;
        let best_bound = snapshot.sense().relaxed_bound();
        Ok(Self {
            model,
            snapshot,
            settings,
            discrete,
            slacks: Vec::new(),
            cuts: Vec::new(),
            explored: HashSet::new(),
            objective: None,
            current_objective_value: None,
            best_bound,
        })
    }

    /// Replace the active objective with the penalized one for `iteration`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoActiveObjective`] if the active objective was
    /// removed from under the manager.
    pub fn install_objective(&mut self, iteration: usize) -> Result<&AugmentedObjective, ModelError> {
        let objective = install_augmented_objective(
            &mut self.model,
            &self.snapshot,
            &self.slacks,
            self.settings.penalty_factor,
            iteration,
        )?;
        Ok(self.objective.insert(objective))
    }

    /// Solve the master with the MILP adapter.
    ///
    /// Solves whatever objective is active: the penalized one after
    /// [`install_objective`](Self::install_objective), the original before.
    ///
    /// Infeasible, unbounded, limit and error statuses are returned as
    /// results; only adapter failures and malformed solutions are errors.
    /// Only an optimal solve tightens the proven bound, monotonically.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the adapter fails or returns a point of
    /// the wrong dimension.
    pub fn solve(
        &mut self,
        solver: &dyn MilpSolver,
        options: &SolveOptions,
    ) -> Result<MasterSolveResult, SolverError> {
        let solution = solver
            .solve_milp(&self.model, options)
            .map_err(|e| SolverError::new(solver.name(), e.to_string()))?;

        if solution.status != MilpStatus::Optimal {
            self.current_objective_value = None;
            return Ok(MasterSolveResult {
                status: solution.status,
                objective: f64::NAN,
                original_objective: f64::NAN,
                assignment: None,
                values: Vec::new(),
            });
        }

        if solution.values.len() != self.model.num_variables() {
            return Err(SolverError::new(
                solver.name(),
                format!(
                    "returned {} values for {} master variables",
                    solution.values.len(),
                    self.model.num_variables()
                ),
            ));
        }

        let original_objective = self.objective.as_ref().map_or_else(
            || self.snapshot.objective().evaluate(&solution.values),
            |o| o.original.evaluate(&solution.values),
        );

        for var in &self.discrete {
            let value = solution.values[var.index()];
            if (value - value.round()).abs() > self.settings.integer_tolerance {
                warn!(var = %var, value, "master returned a fractional binary; rounding");
            }
        }
        let assignment = Assignment::from_values(self.discrete.iter().copied(), &solution.values);

        self.current_objective_value = Some(solution.objective);
        self.best_bound = self.sense().worst_of(self.best_bound, solution.objective);
        debug!(
            objective = solution.objective,
            original = original_objective,
            best_bound = self.best_bound,
            assignment = %assignment,
            "master solved"
        );

        Ok(MasterSolveResult {
            status: MilpStatus::Optimal,
            objective: solution.objective,
            original_objective,
            assignment: Some(assignment),
            values: solution.values,
        })
    }

    /// Append a cut to the master.
    ///
    /// Integer cuts for an already excluded assignment are skipped. OA cuts
    /// are relaxed by a fresh penalized slack when slacks are enabled, and
    /// disjunct-local cuts are switched off by big-M when their indicator is
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the cut references unknown variables.
    pub fn add_cut(&mut self, cut: Cut) -> Result<CutInsertion, ModelError> {
        let id = match &cut {
            Cut::Integer(integer) => {
                if !self.explored.insert(integer.excluded.clone()) {
                    warn!(assignment = %integer.excluded, "integer cut already present, skipping");
                    return Ok(CutInsertion::Skipped);
                }
                let name = format!("integer_cut_{}", self.cuts.len());
                self.model.add_constraint(integer.to_constraint(name))?
            }
            Cut::OuterApproximation(oa) => {
                let row = self.relaxed_oa_row(oa)?;
                self.model.add_constraint(row)?
            }
        };
        self.cuts.push(cut);
        Ok(CutInsertion::Added(id))
    }

    fn relaxed_oa_row(&mut self, cut: &OaCut) -> Result<LinearConstraint, ModelError> {
        let indicator = match cut.scope {
            CutScope::Global => None,
            CutScope::Disjunct { indicator, .. } => Some(indicator),
        };
        if let Some(v) = cut.expr.max_var().max(indicator) {
            if self.model.variable(v).is_none() {
                return Err(ModelError::UnknownVariable(v));
            }
        }

        let ordinal = self.cuts.len();
        let mut expr = cut.expr.clone();
        let mut rhs = cut.rhs;

        if let CutScope::Disjunct { indicator, .. } = cut.scope {
            // Computed before the slack exists so it plays no part in M.
            let (lo, hi) = expr.range(|v| self.model.bounds(v));
            let big_m = match cut.direction {
                CutDirection::Upper => hi - rhs,
                CutDirection::Lower => rhs - lo,
            };
            let big_m = if big_m.is_finite() {
                big_m.max(0.0)
            } else {
                self.settings.big_m
            };
            match cut.direction {
                // expr <= rhs + M (1 - y)
                CutDirection::Upper => {
                    expr.add_term(indicator, big_m);
                    rhs += big_m;
                }
                // expr >= rhs - M (1 - y)
                CutDirection::Lower => {
                    expr.add_term(indicator, -big_m);
                    rhs -= big_m;
                }
            }
        }

        if self.settings.oa_slacks {
            let slack = self.model.add_variable(Variable::continuous(
                format!("oa_slack_{ordinal}"),
                VariableBounds::non_negative(),
            ));
            self.slacks.push(slack);
            match cut.direction {
                CutDirection::Upper => expr.add_term(slack, -1.0),
                CutDirection::Lower => expr.add_term(slack, 1.0),
            };
        }

        let name = format!("oa_cut_{ordinal}");
        Ok(match cut.direction {
            CutDirection::Upper => LinearConstraint::leq(name, expr, rhs),
            CutDirection::Lower => LinearConstraint::geq(name, expr, rhs),
        })
    }

    /// Whether an integer cut already excludes `assignment`.
    #[must_use]
    pub fn is_explored(&self, assignment: &Assignment) -> bool {
        self.explored.contains(assignment)
    }

    /// Tighten the bound to a known optimal value after the master became
    /// infeasible.
    pub fn close_bound(&mut self, value: f64) {
        self.best_bound = self.sense().worst_of(self.best_bound, value);
    }

    #[must_use]
    pub const fn best_bound(&self) -> f64 {
        self.best_bound
    }

    #[must_use]
    pub const fn current_objective_value(&self) -> Option<f64> {
        self.current_objective_value
    }

    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.snapshot.sense()
    }

    #[must_use]
    pub const fn snapshot(&self) -> &ProblemSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn model(&self) -> &MasterModel {
        &self.model
    }

    #[must_use]
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    #[must_use]
    pub fn slacks(&self) -> &[VarId] {
        &self.slacks
    }

    #[must_use]
    pub fn num_oa_cuts(&self) -> usize {
        self.cuts.iter().filter(|c| !c.is_integer()).count()
    }

    #[must_use]
    pub fn num_integer_cuts(&self) -> usize {
        self.cuts.iter().filter(|c| c.is_integer()).count()
    }

    /// Give the model back, cuts and objectives included.
    #[must_use]
    pub fn into_model(self) -> MasterModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntegerCut, LinearExpr, NlConstraintId, Objective};
    use crate::testkit::solver::ScriptedMilpSolver;

    fn settings() -> MasterSettings {
        MasterSettings {
            penalty_factor: 1000.0,
            oa_slacks: true,
            big_m: 1e4,
            integer_tolerance: 1e-5,
        }
    }

    /// min x with x in [0, 10] and one binary y.
    fn manager(settings: MasterSettings) -> (MasterProblemManager, VarId, VarId) {
        let mut model = MasterModel::new();
        let x = model.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 10.0)));
        let y = model.add_variable(Variable::binary("y"));
        model
            .set_objective(Objective::minimize("obj", LinearExpr::var(x)))
            .unwrap();
        let manager = MasterProblemManager::new(model, vec![y], settings).unwrap();
        (manager, x, y)
    }

    fn oa_cut(expr: LinearExpr, direction: CutDirection, rhs: f64, scope: CutScope) -> Cut {
        Cut::OuterApproximation(OaCut {
            source: NlConstraintId::new(0),
            expr,
            direction,
            rhs,
            scope,
            iteration: 1,
        })
    }

    #[test]
    fn solve_extracts_assignment_and_tightens_bound() {
        let (mut manager, _, y) = manager(settings());
        manager.install_objective(1).unwrap();
        let solver = ScriptedMilpSolver::new().optimal(2.0, vec![2.0, 1.0]);

        let result = manager.solve(&solver, &SolveOptions::default()).unwrap();

        assert_eq!(result.status, MilpStatus::Optimal);
        assert_eq!(result.original_objective, 2.0);
        assert_eq!(result.assignment.unwrap().get(y), Some(true));
        assert_eq!(manager.best_bound(), 2.0);
        assert_eq!(manager.current_objective_value(), Some(2.0));
    }

    #[test]
    fn bound_never_loosens() {
        let (mut manager, _, _) = manager(settings());
        let solver = ScriptedMilpSolver::new()
            .optimal(5.0, vec![5.0, 0.0])
            .optimal(3.0, vec![3.0, 1.0]);

        manager.install_objective(1).unwrap();
        manager.solve(&solver, &SolveOptions::default()).unwrap();
        manager.install_objective(2).unwrap();
        manager.solve(&solver, &SolveOptions::default()).unwrap();

        assert_eq!(manager.best_bound(), 5.0);
    }

    #[test]
    fn infeasible_master_is_a_status_not_an_error() {
        let (mut manager, _, _) = manager(settings());
        manager.install_objective(1).unwrap();
        let solver = ScriptedMilpSolver::new().status(MilpStatus::Infeasible);

        let result = manager.solve(&solver, &SolveOptions::default()).unwrap();

        assert_eq!(result.status, MilpStatus::Infeasible);
        assert!(result.assignment.is_none());
        assert_eq!(manager.best_bound(), f64::NEG_INFINITY);
    }

    #[test]
    fn limited_master_leaves_bound_untouched() {
        let (mut manager, _, _) = manager(settings());
        manager.install_objective(1).unwrap();
        let solver = ScriptedMilpSolver::new()
            .optimal(1.0, vec![1.0, 0.0])
            .limited(7.0, vec![7.0, 1.0]);

        manager.solve(&solver, &SolveOptions::default()).unwrap();
        manager.install_objective(2).unwrap();
        let result = manager.solve(&solver, &SolveOptions::default()).unwrap();

        assert_eq!(result.status, MilpStatus::TimeLimit);
        assert!(result.assignment.is_none());
        assert_eq!(manager.best_bound(), 1.0);
        assert_eq!(manager.current_objective_value(), None);
    }

    #[test]
    fn solve_before_install_uses_original_objective() {
        let (mut manager, _, _) = manager(settings());
        let solver = ScriptedMilpSolver::new().optimal(3.0, vec![3.0, 1.0]);

        let result = manager.solve(&solver, &SolveOptions::default()).unwrap();

        assert_eq!(result.original_objective, 3.0);
        assert_eq!(manager.model().objectives().len(), 1);
    }

    #[test]
    fn wrong_dimension_is_an_error() {
        let (mut manager, _, _) = manager(settings());
        manager.install_objective(1).unwrap();
        let solver = ScriptedMilpSolver::new().exact(1.0, vec![1.0, 0.0, 0.0]);
        assert!(manager.solve(&solver, &SolveOptions::default()).is_err());
    }

    #[test]
    fn global_oa_cut_gets_penalized_slack() {
        let (mut manager, x, _) = manager(settings());
        let cut = oa_cut(LinearExpr::var(x), CutDirection::Lower, 4.0, CutScope::Global);

        manager.add_cut(cut).unwrap();

        assert_eq!(manager.slacks().len(), 1);
        let slack = manager.slacks()[0];
        let row = manager.model().list_constraints().last().unwrap();
        // x + s >= 4
        assert!(row.is_satisfied(&[4.0, 0.0, 0.0], 1e-9));
        assert!(row.is_satisfied(&[1.0, 0.0, 3.0], 1e-9));
        assert!(!row.is_satisfied(&[1.0, 0.0, 0.0], 1e-9));

        let objective = manager.install_objective(2).unwrap();
        assert!(objective.penalized.terms().contains(&(slack, 1000.0)));
    }

    #[test]
    fn disjunct_cut_is_relaxed_by_big_m() {
        let (mut manager, x, y) = manager(MasterSettings {
            oa_slacks: false,
            ..settings()
        });
        // x <= 2 only when y = 1; bounds give M = 10 - 2.
        let scope = CutScope::Disjunct {
            disjunct: crate::domain::DisjunctId::new(0),
            indicator: y,
        };
        manager
            .add_cut(oa_cut(LinearExpr::var(x), CutDirection::Upper, 2.0, scope))
            .unwrap();

        let row = manager.model().list_constraints().last().unwrap();
        assert!(row.is_satisfied(&[2.0, 1.0], 1e-9));
        assert!(!row.is_satisfied(&[3.0, 1.0], 1e-9));
        assert!(row.is_satisfied(&[10.0, 0.0], 1e-9));
        assert!(manager.slacks().is_empty());
    }

    #[test]
    fn unbounded_disjunct_cut_falls_back_to_configured_big_m() {
        let mut model = MasterModel::new();
        let z = model.add_variable(Variable::continuous("z", VariableBounds::free()));
        let y = model.add_variable(Variable::binary("y"));
        model
            .set_objective(Objective::minimize("obj", LinearExpr::var(z)))
            .unwrap();
        let mut manager = MasterProblemManager::new(
            model,
            vec![y],
            MasterSettings {
                oa_slacks: false,
                big_m: 50.0,
                ..settings()
            },
        )
        .unwrap();
        let scope = CutScope::Disjunct {
            disjunct: crate::domain::DisjunctId::new(0),
            indicator: y,
        };
        manager
            .add_cut(oa_cut(LinearExpr::var(z), CutDirection::Upper, 0.0, scope))
            .unwrap();

        let row = manager.model().list_constraints().last().unwrap();
        assert!(row.is_satisfied(&[50.0, 0.0], 1e-9));
        assert!(!row.is_satisfied(&[51.0, 0.0], 1e-9));
    }

    #[test]
    fn duplicate_integer_cut_is_skipped() {
        let (mut manager, _, y) = manager(settings());
        let assignment: Assignment = [(y, true)].into_iter().collect();
        let cut = || {
            Cut::Integer(IntegerCut {
                excluded: assignment.clone(),
                feasible: true,
                iteration: 1,
            })
        };

        assert!(matches!(manager.add_cut(cut()), Ok(CutInsertion::Added(_))));
        assert_eq!(manager.add_cut(cut()), Ok(CutInsertion::Skipped));
        assert!(manager.is_explored(&assignment));
        assert_eq!(manager.num_integer_cuts(), 1);
        assert_eq!(manager.model().num_constraints(), 1);
    }

    #[test]
    fn rejects_cut_on_unknown_variable() {
        let (mut manager, _, _) = manager(settings());
        let cut = oa_cut(
            LinearExpr::var(VarId::new(9)),
            CutDirection::Upper,
            1.0,
            CutScope::Global,
        );
        assert_eq!(
            manager.add_cut(cut),
            Err(ModelError::UnknownVariable(VarId::new(9)))
        );
        assert!(manager.cuts().is_empty());
        assert!(manager.slacks().is_empty());
    }
}

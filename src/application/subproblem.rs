//! Subproblem manager.
//!
//! Fixes the master's discrete assignment on the NLP subproblem, solves it,
//! and releases the fixing again. Fixing is scoped by [`FixingGuard`]: the
//! subproblem can only be solved through a live guard, and dropping the
//! guard restores every touched variable, whether the solve succeeded,
//! failed, or panicked.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Assignment, SubproblemModel, VarId};
use crate::error::{ModelError, SolverError};
use crate::port::{ConstraintLinearization, NlpSolver, NlpStatus, SolveOptions};

/// Classified outcome of one subproblem solve.
#[derive(Debug, Clone, Serialize)]
pub struct SubproblemResult {
    /// `true` only for optimal or locally optimal terminations.
    pub feasible: bool,
    pub status: NlpStatus,
    /// Objective value; `None` unless feasible.
    pub objective: Option<f64>,
    /// Point returned by the adapter, one value per subproblem variable when
    /// feasible.
    pub values: Vec<f64>,
    /// Linearizations at `values`; empty unless feasible.
    pub linearizations: Vec<ConstraintLinearization>,
    /// Assignment the subproblem was solved under.
    pub assignment: Assignment,
}

pub struct SubproblemManager {
    model: SubproblemModel,
}

impl SubproblemManager {
    #[must_use]
    pub const fn new(model: SubproblemModel) -> Self {
        Self { model }
    }

    #[must_use]
    pub const fn model(&self) -> &SubproblemModel {
        &self.model
    }

    /// Give the model back.
    #[must_use]
    pub fn into_model(self) -> SubproblemModel {
        self.model
    }

    /// Fix every variable of `assignment` at its 0/1 value.
    ///
    /// On error, variables fixed so far are restored before returning.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the assignment names a variable the
    /// subproblem does not have.
    pub fn fix_discretes(&mut self, assignment: &Assignment) -> Result<FixingGuard<'_>, ModelError> {
        let mut guard = FixingGuard {
            model: &mut self.model,
            saved: Vec::with_capacity(assignment.len()),
            assignment: assignment.clone(),
        };
        for (var, value) in assignment.iter() {
            let prior = guard.model.variable(var)?;
            let (fixed, start) = (prior.fixed, prior.value);
            guard.saved.push((var, fixed, start));
            guard.model.fix(var, if value { 1.0 } else { 0.0 })?;
        }
        Ok(guard)
    }

    /// Fix, solve, and release in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fixing fails or the adapter fails; the fixing is
    /// released in every case.
    pub fn solve(
        &mut self,
        assignment: &Assignment,
        solver: &dyn NlpSolver,
        options: &SolveOptions,
    ) -> crate::error::Result<SubproblemResult> {
        let guard = self.fix_discretes(assignment)?;
        let result = guard.solve_subproblem(solver, options);
        guard.release_fixing();
        Ok(result?)
    }
}

/// Live fixing of a discrete assignment on the subproblem.
///
/// Restores each fixed variable's previous fixed flag and value when dropped.
pub struct FixingGuard<'a> {
    model: &'a mut SubproblemModel,
    saved: Vec<(VarId, bool, Option<f64>)>,
    assignment: Assignment,
}

impl FixingGuard<'_> {
    /// The subproblem under the current fixing.
    #[must_use]
    pub fn model(&self) -> &SubproblemModel {
        &*self.model
    }

    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Solve the fixed subproblem and classify the outcome.
    ///
    /// Non-optimal statuses are not errors: they yield an infeasible result
    /// and the decomposition goes on.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the adapter fails, or if it reports an
    /// optimal status with a malformed point or objective.
    pub fn solve_subproblem(
        &self,
        solver: &dyn NlpSolver,
        options: &SolveOptions,
    ) -> Result<SubproblemResult, SolverError> {
        let solution = solver
            .solve_nlp(&*self.model, options)
            .map_err(|e| SolverError::new(solver.name(), e.to_string()))?;

        if !solution.status.is_feasible() {
            debug!(status = ?solution.status, assignment = %self.assignment, "subproblem infeasible");
            return Ok(SubproblemResult {
                feasible: false,
                status: solution.status,
                objective: None,
                values: solution.values,
                linearizations: Vec::new(),
                assignment: self.assignment.clone(),
            });
        }

        let expected = self.model.num_variables();
        if solution.values.len() != expected {
            return Err(SolverError::new(
                solver.name(),
                format!(
                    "returned {} values for {expected} subproblem variables",
                    solution.values.len()
                ),
            ));
        }
        if !solution.objective.is_finite() {
            return Err(SolverError::new(
                solver.name(),
                format!("reported {:?} with objective {}", solution.status, solution.objective),
            ));
        }

        debug!(
            objective = solution.objective,
            assignment = %self.assignment,
            "subproblem feasible"
        );
        Ok(SubproblemResult {
            feasible: true,
            status: solution.status,
            objective: Some(solution.objective),
            values: solution.values,
            linearizations: solution.linearizations,
            assignment: self.assignment.clone(),
        })
    }

    /// Restore the subproblem to its state before fixing.
    pub fn release_fixing(self) {}

    fn restore(&mut self) {
        for (var, fixed, value) in self.saved.drain(..).rev() {
            // Ids were validated when saved.
            let _ = self.model.set_value(var, value);
            if !fixed {
                let _ = self.model.unfix(var);
            }
        }
    }
}

impl Drop for FixingGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sense, Variable, VariableBounds};
    use crate::testkit::solver::ScriptedNlpSolver;

    fn model() -> (SubproblemModel, VarId, VarId) {
        let mut model = SubproblemModel::new(Sense::Minimize);
        model.add_variable(Variable::continuous("x", VariableBounds::bounded(0.0, 5.0)));
        let y0 = model.add_variable(Variable::binary("y0").with_value(0.3));
        let y1 = model.add_variable(Variable::binary("y1"));
        (model, y0, y1)
    }

    fn assignment(y0: VarId, y1: VarId) -> Assignment {
        [(y0, true), (y1, false)].into_iter().collect()
    }

    #[test]
    fn guard_fixes_and_restores() {
        let (model, y0, y1) = model();
        let mut manager = SubproblemManager::new(model);

        {
            let guard = manager.fix_discretes(&assignment(y0, y1)).unwrap();
            assert_eq!(guard.model().num_fixed(), 2);
            assert_eq!(guard.model().variable(y0).unwrap().value, Some(1.0));
        }

        let restored = manager.model().variable(y0).unwrap();
        assert!(!restored.fixed);
        assert_eq!(restored.value, Some(0.3));
        assert_eq!(manager.model().num_fixed(), 0);
    }

    #[test]
    fn failed_fixing_restores_partial_work() {
        let (model, y0, _) = model();
        let mut manager = SubproblemManager::new(model);
        let bad: Assignment = [(y0, true), (VarId::new(7), false)].into_iter().collect();

        assert!(manager.fix_discretes(&bad).is_err());
        assert_eq!(manager.model().num_fixed(), 0);
    }

    #[test]
    fn feasible_solve_keeps_linearizations() {
        let (model, y0, y1) = model();
        let mut manager = SubproblemManager::new(model);
        let solver = ScriptedNlpSolver::new().feasible(&assignment(y0, y1), 4.0, vec![2.0, 1.0, 0.0]);

        let result = manager
            .solve(&assignment(y0, y1), &solver, &SolveOptions::default())
            .unwrap();

        assert!(result.feasible);
        assert_eq!(result.objective, Some(4.0));
        assert_eq!(manager.model().num_fixed(), 0);
        assert_eq!(solver.calls(), vec![assignment(y0, y1)]);
    }

    #[test]
    fn non_optimal_status_is_infeasible_result() {
        let (model, y0, y1) = model();
        let mut manager = SubproblemManager::new(model);
        let solver = ScriptedNlpSolver::new().status(&assignment(y0, y1), NlpStatus::Limit);

        let result = manager
            .solve(&assignment(y0, y1), &solver, &SolveOptions::default())
            .unwrap();

        assert!(!result.feasible);
        assert_eq!(result.status, NlpStatus::Limit);
        assert!(result.objective.is_none());
        assert!(result.linearizations.is_empty());
    }

    #[test]
    fn adapter_failure_still_releases_fixing() {
        let (model, y0, y1) = model();
        let mut manager = SubproblemManager::new(model);
        let solver = ScriptedNlpSolver::new().failing(&assignment(y0, y1), "boom");

        assert!(manager
            .solve(&assignment(y0, y1), &solver, &SolveOptions::default())
            .is_err());
        assert_eq!(manager.model().num_fixed(), 0);
        assert_eq!(manager.model().variable(y0).unwrap().value, Some(0.3));
    }

    #[test]
    fn wrong_dimension_is_an_error() {
        let (model, y0, y1) = model();
        let mut manager = SubproblemManager::new(model);
        let solver = ScriptedNlpSolver::new().feasible(&assignment(y0, y1), 1.0, vec![1.0]);

        assert!(manager
            .solve(&assignment(y0, y1), &solver, &SolveOptions::default())
            .is_err());
        assert_eq!(manager.model().num_fixed(), 0);
    }

    #[test]
    fn previously_fixed_variable_stays_fixed() {
        let (mut model, _, y1) = model();
        model.fix(y1, 1.0).unwrap();
        let mut manager = SubproblemManager::new(model);
        let flip: Assignment = [(y1, false)].into_iter().collect();

        drop(manager.fix_discretes(&flip).unwrap());

        let var = manager.model().variable(y1).unwrap();
        assert!(var.fixed);
        assert_eq!(var.value, Some(1.0));
    }
}

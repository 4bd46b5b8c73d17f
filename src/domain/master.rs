//! The MILP master model.
//!
//! Holds the linear relaxation of the disjunctive program after reformulation:
//! variables, linear rows, and a list of objectives of which at most one is
//! active. Objectives are swapped through an explicit handle and never
//! deleted, so earlier objectives remain inspectable.

use serde::Serialize;

use super::constraint::{LinearConstraint, VariableBounds};
use super::id::{ConstraintId, ObjectiveId, VarId};
use super::objective::Objective;
use super::variable::Variable;
use crate::error::ModelError;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MasterModel {
    variables: Vec<Variable>,
    constraints: Vec<LinearConstraint>,
    objectives: Vec<Objective>,
    active: Option<ObjectiveId>,
}

impl MasterModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable and return its id.
    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId::new(self.variables.len() - 1)
    }

    /// Append a linear constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownVariable`] if the constraint references a
    /// variable that does not exist.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> Result<ConstraintId, ModelError> {
        self.check_expr_vars(constraint.expr.max_var())?;
        self.constraints.push(constraint);
        Ok(ConstraintId::new(self.constraints.len() - 1))
    }

    /// Append an objective without activating it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownVariable`] on a dangling variable reference.
    pub fn add_objective(&mut self, objective: Objective) -> Result<ObjectiveId, ModelError> {
        self.check_expr_vars(objective.expr.max_var())?;
        self.objectives.push(objective);
        Ok(ObjectiveId::new(self.objectives.len() - 1))
    }

    /// Append an objective and make it the active one.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownVariable`] on a dangling variable reference.
    pub fn set_objective(&mut self, objective: Objective) -> Result<ObjectiveId, ModelError> {
        let id = self.add_objective(objective)?;
        self.active = Some(id);
        Ok(id)
    }

    /// Make `id` the active objective, returning the previously active one.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownObjective`] if `id` does not exist.
    pub fn activate_objective(&mut self, id: ObjectiveId) -> Result<Option<ObjectiveId>, ModelError> {
        if id.index() >= self.objectives.len() {
            return Err(ModelError::UnknownObjective(id.index()));
        }
        Ok(self.active.replace(id))
    }

    /// Deactivate the current objective, returning it.
    pub fn deactivate_objective(&mut self) -> Option<ObjectiveId> {
        self.active.take()
    }

    #[must_use]
    pub fn active_objective(&self) -> Option<(ObjectiveId, &Objective)> {
        self.active
            .map(|id| (id, &self.objectives[id.index()]))
    }

    #[must_use]
    pub fn objective(&self, id: ObjectiveId) -> Option<&Objective> {
        self.objectives.get(id.index())
    }

    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    #[must_use]
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    #[must_use]
    pub fn list_variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn list_constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Bounds of a variable; free bounds for unknown ids.
    #[must_use]
    pub fn bounds(&self, id: VarId) -> VariableBounds {
        self.variable(id)
            .map_or_else(VariableBounds::free, |v| v.bounds)
    }

    fn check_expr_vars(&self, max_var: Option<VarId>) -> Result<(), ModelError> {
        match max_var {
            Some(v) if v.index() >= self.variables.len() => Err(ModelError::UnknownVariable(v)),
            _ => Ok(()),
        }
    }
}

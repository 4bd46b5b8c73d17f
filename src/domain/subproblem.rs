//! The nonlinear subproblem model.
//!
//! Nonlinear constraint bodies are opaque here: the NLP adapter owns their
//! evaluation and reports values and gradients back. This model only tracks
//! what the decomposition needs: bounds, disjunct membership, and which
//! variables are currently fixed.

use serde::Serialize;

use super::disjunct::Disjunct;
use super::id::{DisjunctId, NlConstraintId, VarId};
use super::objective::Sense;
use super::variable::Variable;
use crate::error::ModelError;

/// A nonlinear constraint `lower <= g(x) <= upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonlinearConstraint {
    pub name: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Owning disjunct; `None` for constraints that always hold.
    pub disjunct: Option<DisjunctId>,
}

impl NonlinearConstraint {
    /// `g(x) <= upper`
    #[must_use]
    pub fn leq(name: impl Into<String>, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower: None,
            upper: Some(upper),
            disjunct: None,
        }
    }

    /// `g(x) >= lower`
    #[must_use]
    pub fn geq(name: impl Into<String>, lower: f64) -> Self {
        Self {
            name: name.into(),
            lower: Some(lower),
            upper: None,
            disjunct: None,
        }
    }

    /// `g(x) == value`
    #[must_use]
    pub fn eq(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            lower: Some(value),
            upper: Some(value),
            disjunct: None,
        }
    }

    /// Attach the constraint to a disjunct.
    #[must_use]
    pub const fn in_disjunct(mut self, disjunct: DisjunctId) -> Self {
        self.disjunct = Some(disjunct);
        self
    }

    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!((self.lower, self.upper), (Some(l), Some(u)) if l == u)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubproblemModel {
    variables: Vec<Variable>,
    constraints: Vec<NonlinearConstraint>,
    disjuncts: Vec<Disjunct>,
    sense: Sense,
}

impl SubproblemModel {
    #[must_use]
    pub const fn new(sense: Sense) -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            disjuncts: Vec::new(),
            sense,
        }
    }

    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId::new(self.variables.len() - 1)
    }

    /// Register a disjunct.
    ///
    /// # Errors
    ///
    /// Fails if the indicator is unknown or not binary.
    pub fn add_disjunct(&mut self, disjunct: Disjunct) -> Result<DisjunctId, ModelError> {
        let indicator = self.variable(disjunct.indicator)?;
        if !indicator.is_binary() {
            return Err(ModelError::NotBinary {
                var: disjunct.indicator,
            });
        }
        self.disjuncts.push(disjunct);
        Ok(DisjunctId::new(self.disjuncts.len() - 1))
    }

    /// Register a nonlinear constraint.
    ///
    /// # Errors
    ///
    /// Fails if the owning disjunct was never registered.
    pub fn add_constraint(
        &mut self,
        constraint: NonlinearConstraint,
    ) -> Result<NlConstraintId, ModelError> {
        if let Some(d) = constraint.disjunct {
            if d.index() >= self.disjuncts.len() {
                return Err(ModelError::UnknownDisjunct(d));
            }
        }
        self.constraints.push(constraint);
        Ok(NlConstraintId::new(self.constraints.len() - 1))
    }

    /// Fix `var` at `value`.
    ///
    /// # Errors
    ///
    /// Fails for unknown variables and values outside the variable's bounds.
    pub fn fix(&mut self, var: VarId, value: f64) -> Result<(), ModelError> {
        let variable = self.variable_mut(var)?;
        if !variable.bounds.contains(value, 1e-9) {
            return Err(ModelError::OutOfBounds {
                name: variable.name.clone(),
                value,
            });
        }
        variable.value = Some(value);
        variable.fixed = true;
        Ok(())
    }

    /// Release a fixed variable, keeping its current value as a start point.
    ///
    /// # Errors
    ///
    /// Fails for unknown variables.
    pub fn unfix(&mut self, var: VarId) -> Result<(), ModelError> {
        self.variable_mut(var)?.fixed = false;
        Ok(())
    }

    /// Overwrite the stored value of `var` without touching its fixed flag.
    ///
    /// # Errors
    ///
    /// Fails for unknown variables.
    pub fn set_value(&mut self, var: VarId, value: Option<f64>) -> Result<(), ModelError> {
        self.variable_mut(var)?.value = value;
        Ok(())
    }

    /// Look up a variable.
    ///
    /// # Errors
    ///
    /// Fails for unknown variables.
    pub fn variable(&self, var: VarId) -> Result<&Variable, ModelError> {
        self.variables
            .get(var.index())
            .ok_or(ModelError::UnknownVariable(var))
    }

    fn variable_mut(&mut self, var: VarId) -> Result<&mut Variable, ModelError> {
        self.variables
            .get_mut(var.index())
            .ok_or(ModelError::UnknownVariable(var))
    }

    #[must_use]
    pub fn list_variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn list_constraints(&self) -> &[NonlinearConstraint] {
        &self.constraints
    }

    #[must_use]
    pub fn list_disjuncts(&self) -> &[Disjunct] {
        &self.disjuncts
    }

    #[must_use]
    pub fn constraint(&self, id: NlConstraintId) -> Option<&NonlinearConstraint> {
        self.constraints.get(id.index())
    }

    #[must_use]
    pub fn disjunct(&self, id: DisjunctId) -> Option<&Disjunct> {
        self.disjuncts.get(id.index())
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.sense
    }

    /// Binary variables, in order.
    pub fn binary_variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_binary())
            .map(|(i, _)| VarId::new(i))
    }

    /// Number of currently fixed variables.
    #[must_use]
    pub fn num_fixed(&self) -> usize {
        self.variables.iter().filter(|v| v.fixed).count()
    }

    /// A disjunct is active when its indicator is fixed at one.
    #[must_use]
    pub fn is_disjunct_active(&self, id: DisjunctId) -> bool {
        self.disjunct(id)
            .and_then(|d| self.variables.get(d.indicator.index()))
            .is_some_and(|v| v.fixed && v.value.is_some_and(|x| x >= 0.5))
    }

    /// Constraints the NLP must enforce under the current fixing: global
    /// constraints plus those of active disjuncts.
    pub fn active_constraints(&self) -> impl Iterator<Item = (NlConstraintId, &NonlinearConstraint)> + '_ {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| c.disjunct.map_or(true, |d| self.is_disjunct_active(d)))
            .map(|(i, c)| (NlConstraintId::new(i), c))
    }
}

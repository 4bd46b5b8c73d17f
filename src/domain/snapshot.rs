//! Immutable record of the problem as handed to the algorithm.

use serde::Serialize;

use super::expression::LinearExpr;
use super::master::MasterModel;
use super::objective::Sense;
use crate::error::ModelError;

/// The original objective, captured once before the master objective is
/// replaced by its penalized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemSnapshot {
    objective_name: String,
    objective: LinearExpr,
    sense: Sense,
}

impl ProblemSnapshot {
    /// Capture the master's active objective.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoActiveObjective`] if no objective is active.
    pub fn capture(master: &MasterModel) -> Result<Self, ModelError> {
        let (_, objective) = master
            .active_objective()
            .ok_or(ModelError::NoActiveObjective)?;
        Ok(Self {
            objective_name: objective.name.clone(),
            objective: objective.expr.clone(),
            sense: objective.sense,
        })
    }

    #[must_use]
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    #[must_use]
    pub fn objective_name(&self) -> &str {
        &self.objective_name
    }

    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.sense
    }
}

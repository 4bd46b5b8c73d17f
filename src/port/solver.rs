//! Solver ports for the master MILP and the nonlinear subproblem.
//!
//! # Overview
//!
//! - [`MilpSolver`]: Solves the master model as it stands, cuts included
//! - [`NlpSolver`]: Solves the subproblem with its discrete variables fixed
//! - [`MilpSolution`] / [`NlpSolution`]: Solution representations

use std::time::Duration;

use serde::Serialize;

use crate::domain::{MasterModel, NlConstraintId, SubproblemModel, VarId};
use crate::error::Result;

/// Per-call limits passed to an adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock limit for this call.
    pub time_limit: Option<Duration>,
    /// Relative optimality gap accepted by a MILP backend.
    pub relative_gap: Option<f64>,
}

/// Mixed-integer linear solver for the master problem.
///
/// Implementations are called once per iteration on the same, progressively
/// cut, [`MasterModel`]; they must not require the model to be rebuilt.
///
/// # Implementation Notes
///
/// - Optimize the model's active objective
/// - Return one value per master variable, slacks included
/// - Report infeasible/unbounded masters through [`MilpStatus`], reserving
///   `Err` for failures of the backend itself
pub trait MilpSolver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Solve the master model.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be invoked or crashes.
    fn solve_milp(&self, model: &MasterModel, options: &SolveOptions) -> Result<MilpSolution>;
}

/// Nonlinear solver for fixed-discrete subproblems.
///
/// # Implementation Notes
///
/// - Respect fixed variables and enforce only
///   [`SubproblemModel::active_constraints`]
/// - Start from the variables' stored values
/// - For every active constraint report `g(x*)` and its gradient with
///   respect to the free variables, plus the multiplier when available
pub trait NlpSolver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Solve the subproblem.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be invoked or crashes.
    fn solve_nlp(&self, model: &SubproblemModel, options: &SolveOptions) -> Result<NlpSolution>;
}

/// Termination status of a MILP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilpStatus {
    /// Optimal within the configured gap.
    Optimal,

    /// No feasible solution exists.
    Infeasible,

    /// Objective function is unbounded.
    Unbounded,

    /// Stopped on a time or other work limit before proving optimality.
    /// Any point returned is feasible but its objective is no bound.
    TimeLimit,

    /// Solver encountered an internal error.
    Error,
}

/// Solution to a master MILP.
#[derive(Debug, Clone)]
pub struct MilpSolution {
    pub status: MilpStatus,

    /// Value of the active objective; meaningful only when optimal.
    pub objective: f64,

    /// One value per master variable.
    pub values: Vec<f64>,
}

impl MilpSolution {
    /// Return `true` if the solver found an optimal solution.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == MilpStatus::Optimal
    }

    /// A solution carrying only a status.
    #[must_use]
    pub const fn with_status(status: MilpStatus) -> Self {
        Self {
            status,
            objective: f64::NAN,
            values: Vec::new(),
        }
    }
}

/// Termination status of an NLP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NlpStatus {
    /// Globally optimal.
    Optimal,
    /// Locally optimal (the usual outcome for nonconvex problems).
    LocallyOptimal,
    /// Proven or detected infeasible.
    Infeasible,
    /// Stopped at an iteration or time limit without a feasible point.
    Limit,
    /// Numerical breakdown.
    NumericalFailure,
    /// Any other solver-reported failure.
    Error,
}

impl NlpStatus {
    /// Only optimal terminations yield a point cuts can be derived from.
    #[must_use]
    pub const fn is_feasible(self) -> bool {
        matches!(self, Self::Optimal | Self::LocallyOptimal)
    }
}

/// Linearization data for one nonlinear constraint at the solution point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintLinearization {
    pub constraint: NlConstraintId,
    /// `g(x*)`
    pub value: f64,
    /// Nonzero partial derivatives of `g` at `x*`.
    pub gradient: Vec<(VarId, f64)>,
    /// Constraint multiplier, if the backend provides one.
    pub dual: Option<f64>,
}

/// Solution to a fixed-discrete subproblem.
#[derive(Debug, Clone)]
pub struct NlpSolution {
    pub status: NlpStatus,
    pub objective: f64,
    /// One value per subproblem variable.
    pub values: Vec<f64>,
    pub linearizations: Vec<ConstraintLinearization>,
}

impl NlpSolution {
    /// A solution carrying only a status.
    #[must_use]
    pub const fn with_status(status: NlpStatus) -> Self {
        Self {
            status,
            objective: f64::NAN,
            values: Vec::new(),
            linearizations: Vec::new(),
        }
    }
}

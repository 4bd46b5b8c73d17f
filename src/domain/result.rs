//! Outcome of a decomposition run.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::Component;

/// Iteration counters, owned and advanced by the driver only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IterationCounters {
    /// Master solves that produced an assignment to explore.
    pub master_iteration: usize,
    /// Total MILP solves, including a final one proving exhaustion.
    pub mip_iteration: usize,
    /// Total NLP subproblem solves.
    pub nlp_iteration: usize,
}

/// Wall-clock time spent per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub mip: Duration,
    pub nlp: Duration,
    pub total: Duration,
}

/// Best feasible solution found so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incumbent {
    pub objective: f64,
    /// Values of the original variables, indexed by [`VarId`](super::VarId).
    pub values: Vec<f64>,
    /// Master iteration that found it.
    pub iteration: usize,
}

/// State of the termination state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationState {
    Running,
    Converged,
    Infeasible,
    IterationLimit,
    TimeLimit,
    Error,
}

impl TerminationState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for TerminationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Converged => "converged",
            Self::Infeasible => "infeasible",
            Self::IterationLimit => "iteration limit",
            Self::TimeLimit => "time limit",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Termination {
    /// Bounds met, or the master ran out of assignments with an incumbent.
    Converged { iteration: usize, cause: String },
    /// No discrete assignment admits a feasible subproblem.
    Infeasible { iteration: usize, cause: String },
    IterationLimit { iteration: usize },
    TimeLimit { iteration: usize, elapsed: Duration },
    Error {
        iteration: usize,
        component: Component,
        cause: String,
    },
}

impl Termination {
    #[must_use]
    pub const fn state(&self) -> TerminationState {
        match self {
            Self::Converged { .. } => TerminationState::Converged,
            Self::Infeasible { .. } => TerminationState::Infeasible,
            Self::IterationLimit { .. } => TerminationState::IterationLimit,
            Self::TimeLimit { .. } => TerminationState::TimeLimit,
            Self::Error { .. } => TerminationState::Error,
        }
    }

    /// Master iteration at which the run stopped.
    #[must_use]
    pub const fn iteration(&self) -> usize {
        match self {
            Self::Converged { iteration, .. }
            | Self::Infeasible { iteration, .. }
            | Self::IterationLimit { iteration }
            | Self::TimeLimit { iteration, .. }
            | Self::Error { iteration, .. } => *iteration,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged { iteration, cause } => {
                write!(f, "converged at iteration {iteration}: {cause}")
            }
            Self::Infeasible { iteration, cause } => {
                write!(f, "infeasible at iteration {iteration}: {cause}")
            }
            Self::IterationLimit { iteration } => {
                write!(f, "iteration limit reached after {iteration} iterations")
            }
            Self::TimeLimit { iteration, elapsed } => write!(
                f,
                "time limit reached after {:.3}s at iteration {iteration}",
                elapsed.as_secs_f64()
            ),
            Self::Error {
                iteration,
                component,
                cause,
            } => write!(f, "{component} error at iteration {iteration}: {cause}"),
        }
    }
}

/// Result of [`LoaSolver::solve`](crate::application::LoaSolver::solve).
#[derive(Debug, Clone, Serialize)]
pub struct LoaResult {
    pub termination: Termination,
    pub incumbent: Option<Incumbent>,
    /// Best proven bound on the optimum (lower for minimize, upper for maximize).
    pub best_bound: f64,
    pub counters: IterationCounters,
    pub timing: Timing,
    pub oa_cuts: usize,
    pub integer_cuts: usize,
}

impl LoaResult {
    #[must_use]
    pub const fn state(&self) -> TerminationState {
        self.termination.state()
    }

    #[must_use]
    pub fn objective(&self) -> Option<f64> {
        self.incumbent.as_ref().map(|i| i.objective)
    }

    #[must_use]
    pub fn values(&self) -> Option<&[f64]> {
        self.incumbent.as_ref().map(|i| i.values.as_slice())
    }
}

use std::fmt;

use thiserror::Error;

use crate::domain::{Assignment, DisjunctId, VarId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown {kind} solver '{name}'")]
    UnknownSolver { kind: &'static str, name: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),
}

/// Misuse of the working models (unknown ids, misaligned variable lists).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("unknown variable {0}")]
    UnknownVariable(VarId),

    #[error("unknown disjunct {0}")]
    UnknownDisjunct(DisjunctId),

    #[error("unknown objective #{0}")]
    UnknownObjective(usize),

    #[error("master model has no active objective")]
    NoActiveObjective,

    #[error("variable {var} is not binary")]
    NotBinary { var: VarId },

    #[error("value {value} for variable '{name}' is outside its bounds")]
    OutOfBounds { name: String, value: f64 },

    #[error(
        "master variable {index} is '{master}' but subproblem variable is '{subproblem}'"
    )]
    VariableMismatch {
        index: usize,
        master: String,
        subproblem: String,
    },

    #[error("master model has {master} variables, fewer than the subproblem's {subproblem}")]
    MissingVariables { master: usize, subproblem: usize },

    #[error("master objective is {master:?} but subproblem objective is {subproblem:?}")]
    SenseMismatch {
        master: crate::domain::Sense,
        subproblem: crate::domain::Sense,
    },
}

/// Failure reported by a solver adapter itself (as opposed to a solve status).
#[derive(Error, Debug, Clone)]
#[error("{solver} failed: {message}")]
pub struct SolverError {
    pub solver: String,
    pub message: String,
}

impl SolverError {
    pub fn new(solver: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            message: message.into(),
        }
    }
}

/// Component of the decomposition loop that raised a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    MasterProblem,
    Subproblem,
    CutGenerator,
    Driver,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MasterProblem => "master problem",
            Self::Subproblem => "subproblem",
            Self::CutGenerator => "cut generator",
            Self::Driver => "driver",
        };
        f.write_str(name)
    }
}

/// Errors raised inside the decomposition loop.
///
/// These never escape [`LoaSolver::solve`](crate::application::LoaSolver::solve);
/// the driver turns them into a terminal
/// [`Termination::Error`](crate::domain::Termination::Error).
#[derive(Error, Debug, Clone)]
pub enum LoaError {
    #[error("{component} failed at iteration {iteration}: {message}")]
    SolverFailure {
        component: Component,
        iteration: usize,
        message: String,
    },

    #[error("assignment {assignment} repeated at iteration {iteration} despite integer cuts")]
    DuplicateAssignment {
        iteration: usize,
        assignment: Assignment,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl LoaError {
    /// Component the failure is attributed to.
    #[must_use]
    pub const fn component(&self) -> Component {
        match self {
            Self::SolverFailure { component, .. } => *component,
            Self::DuplicateAssignment { .. } => Component::MasterProblem,
            Self::Model(_) => Component::Driver,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Loa(#[from] LoaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

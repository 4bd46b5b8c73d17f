//! gdploa - Logic-based outer approximation for generalized disjunctive programs.
//!
//! A disjunctive program is split into two models that never share state:
//! a linear master over every variable, which picks which disjuncts are
//! active, and a nonlinear subproblem, solved with those choices fixed.
//! The driver alternates between them, adding outer-approximation cuts from
//! each feasible subproblem and an integer cut excluding every explored
//! assignment, until the master's bound meets the best feasible solution.
//!
//! # Modules
//!
//! - [`domain`] - Models, expressions, assignments, cuts, and results
//! - [`port`] - MILP and NLP solver contracts
//! - [`adapter`] - HiGHS MILP adapter and the solver registry
//! - [`application`] - Master/subproblem managers, cut generation,
//!   termination, and the [`LoaSolver`](application::LoaSolver) driver
//! - [`infrastructure`] - TOML configuration and logging setup
//! - [`cli`] - The `gdploa` command-line tool
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Scripted solver doubles and small test problems
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gdploa::adapter::HighsMilpSolver;
//! use gdploa::application::{LoaConfig, LoaSolver};
//! use gdploa::domain::{MasterModel, SubproblemModel};
//! use gdploa::port::NlpSolver;
//!
//! fn run(
//!     master: MasterModel,
//!     subproblem: SubproblemModel,
//!     nlp: Arc<dyn NlpSolver>,
//! ) -> gdploa::error::Result<()> {
//!     let solver = LoaSolver::new(LoaConfig::default(), Arc::new(HighsMilpSolver::new()), nlp)?;
//!     let result = solver.solve(master, subproblem)?;
//!     println!("{}: {:?}", result.termination, result.objective());
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

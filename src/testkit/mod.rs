//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`solver`]: Scripted [`MilpSolver`](crate::port::MilpSolver) and
//!   [`NlpSolver`](crate::port::NlpSolver) doubles.
//! - [`problem`]: Small disjunctive instances and a closed-form NLP for one
//!   of them.

pub mod problem;
pub mod solver;

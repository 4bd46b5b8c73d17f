//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The decomposition core never talks to a numerical solver directly; it
//! calls through these contracts, which adapters implement.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  (LOA decomposition)    │
//!                    └────────────┬────────────┘
//!                                 │
//!                ┌────────────────┴────────────────┐
//!                ▼                                 ▼
//!          ┌───────────┐                     ┌───────────┐
//!          │   MILP    │                     │    NLP    │
//!          │  Adapter  │                     │  Adapter  │
//!          └───────────┘                     └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`MilpSolver`] - Master problem backend
//! - [`NlpSolver`] - Fixed-discrete nonlinear subproblem backend

mod solver;

pub use solver::{
    ConstraintLinearization, MilpSolution, MilpSolver, MilpStatus, NlpSolution, NlpSolver,
    NlpStatus, SolveOptions,
};

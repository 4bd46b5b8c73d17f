//! Adapter implementations of the solver ports.

mod highs;
mod registry;

pub use highs::HighsMilpSolver;
pub use registry::SolverRegistry;

//! Application services (use cases).
//!
//! The decomposition engines and the driver that sequences them. Everything
//! here talks to numerical solvers only through the [`port`](crate::port)
//! traits.

mod callback;
mod config;
mod cuts;
mod driver;
mod master;
mod objective;
mod subproblem;
mod termination;

pub use callback::{LoaCallbacks, MasterSolveEvent, NoCallbacks, SubproblemSolveEvent};
pub use config::{LoaConfig, SolverOptionsConfig};
pub use cuts::CutGenerator;
pub use driver::LoaSolver;
pub use master::{CutInsertion, MasterProblemManager, MasterSettings, MasterSolveResult};
pub use objective::{install_augmented_objective, penalty_expression, AugmentedObjective};
pub use subproblem::{FixingGuard, SubproblemManager, SubproblemResult};
pub use termination::{Progress, TerminationEvaluator, TerminationSettings};

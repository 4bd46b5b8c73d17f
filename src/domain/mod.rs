//! Problem representation shared by the decomposition engines.
//!
//! The master and subproblem are independently owned models connected only
//! through explicit transfers: discrete assignments flow from the master to
//! the subproblem, cuts flow back.

mod assignment;
mod constraint;
mod cut;
mod disjunct;
mod expression;
mod id;
mod master;
mod objective;
mod result;
mod snapshot;
mod subproblem;
mod variable;

pub use assignment::Assignment;
pub use constraint::{ConstraintSense, LinearConstraint, VariableBounds};
pub use cut::{Cut, CutDirection, CutScope, IntegerCut, OaCut};
pub use disjunct::Disjunct;
pub use expression::LinearExpr;
pub use id::{ConstraintId, DisjunctId, NlConstraintId, ObjectiveId, VarId};
pub use master::MasterModel;
pub use objective::{Objective, Sense};
pub use result::{
    Incumbent, IterationCounters, LoaResult, Termination, TerminationState, Timing,
};
pub use snapshot::ProblemSnapshot;
pub use subproblem::{NonlinearConstraint, SubproblemModel};
pub use variable::{Variable, VariableKind};

//! Observation hooks into the decomposition loop.

use super::master::MasterSolveResult;
use super::subproblem::SubproblemResult;
use crate::domain::{Incumbent, IterationCounters, MasterModel, SubproblemModel};

/// Emitted after every master solve, including the one that proves the
/// master infeasible.
#[derive(Debug)]
pub struct MasterSolveEvent<'a> {
    pub counters: IterationCounters,
    pub result: &'a MasterSolveResult,
    pub best_bound: f64,
    pub model: &'a MasterModel,
}

/// Emitted after every subproblem, once its cuts are in the master and its
/// fixing has been released.
#[derive(Debug)]
pub struct SubproblemSolveEvent<'a> {
    pub counters: IterationCounters,
    pub result: &'a SubproblemResult,
    pub incumbent: Option<&'a Incumbent>,
    /// OA cuts added to the master for this subproblem.
    pub oa_cuts_added: usize,
    pub model: &'a SubproblemModel,
}

/// Callbacks invoked by [`LoaSolver`](super::LoaSolver).
///
/// All methods default to doing nothing.
pub trait LoaCallbacks {
    fn after_master_solve(&mut self, _event: &MasterSolveEvent<'_>) {}

    fn after_subproblem_solve(&mut self, _event: &SubproblemSolveEvent<'_>) {}
}

/// Callbacks that ignore every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl LoaCallbacks for NoCallbacks {}

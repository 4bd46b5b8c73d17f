//! Termination state machine.
//!
//! `Running` is the only non-terminal state. The driver consults the
//! evaluator after every master solve and after every subproblem; the first
//! check that fires moves the machine to a terminal state, after which the
//! loop stops.
//!
//! | From      | Event                                   | To              |
//! |-----------|-----------------------------------------|-----------------|
//! | Running   | bounds cross within tolerance           | Converged       |
//! | Running   | master infeasible with an incumbent     | Converged       |
//! | Running   | master infeasible, no incumbent         | Infeasible      |
//! | Running   | iteration limit reached                 | IterationLimit  |
//! | Running   | wall-clock limit reached                | TimeLimit       |
//! | Running   | master stopped on its time limit        | TimeLimit       |
//! | Running   | component failure                       | Error           |

use std::time::Duration;

use tracing::info;

use crate::domain::{Sense, Termination, TerminationState};
use crate::error::LoaError;

/// Scale floor for the relative gap, so a zero incumbent does not demand an
/// exact match.
const RELATIVE_GAP_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminationSettings {
    pub iteration_limit: usize,
    pub absolute_gap_tolerance: f64,
    pub relative_gap_tolerance: f64,
    pub time_limit: Option<Duration>,
}

/// Progress the evaluator needs at a check point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Completed master iterations.
    pub iteration: usize,
    pub best_bound: f64,
    /// Objective of the incumbent, if any.
    pub incumbent: Option<f64>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct TerminationEvaluator {
    sense: Sense,
    settings: TerminationSettings,
    state: TerminationState,
}

impl TerminationEvaluator {
    #[must_use]
    pub const fn new(sense: Sense, settings: TerminationSettings) -> Self {
        Self {
            sense,
            settings,
            state: TerminationState::Running,
        }
    }

    #[must_use]
    pub const fn state(&self) -> TerminationState {
        self.state
    }

    /// Signed distance from the bound to the incumbent; positive while open.
    #[must_use]
    pub fn gap(&self, best_bound: f64, incumbent: f64) -> f64 {
        match self.sense {
            Sense::Minimize => incumbent - best_bound,
            Sense::Maximize => best_bound - incumbent,
        }
    }

    /// Whether the bound has reached the incumbent within either tolerance.
    #[must_use]
    pub fn bounds_crossed(&self, best_bound: f64, incumbent: f64) -> bool {
        let gap = self.gap(best_bound, incumbent);
        if gap.is_nan() {
            return false;
        }
        gap <= self.settings.absolute_gap_tolerance
            || gap <= self.settings.relative_gap_tolerance * incumbent.abs().max(RELATIVE_GAP_FLOOR)
    }

    /// Check after a master solve that produced an assignment.
    pub fn after_master(&mut self, progress: &Progress) -> Option<Termination> {
        self.check_bounds(progress)
            .or_else(|| self.check_time(progress))
    }

    /// Check at the end of an iteration, after the subproblem and its cuts.
    pub fn after_subproblem(&mut self, progress: &Progress) -> Option<Termination> {
        self.check_bounds(progress)
            .or_else(|| self.check_iterations(progress))
            .or_else(|| self.check_time(progress))
    }

    /// The master has no feasible assignment left.
    pub fn master_infeasible(&mut self, progress: &Progress) -> Termination {
        let termination = if progress.incumbent.is_some() {
            Termination::Converged {
                iteration: progress.iteration,
                cause: "master problem infeasible: every assignment explored or excluded".into(),
            }
        } else {
            Termination::Infeasible {
                iteration: progress.iteration,
                cause: "master problem infeasible before any feasible subproblem was found".into(),
            }
        };
        self.finish(termination)
    }

    /// The master stopped on a limit without proving optimality; its point
    /// can neither be explored nor bound the optimum.
    pub fn master_limit(&mut self, progress: &Progress) -> Termination {
        self.finish(Termination::TimeLimit {
            iteration: progress.iteration,
            elapsed: progress.elapsed,
        })
    }

    /// Whether the run's wall-clock budget is spent.
    #[must_use]
    pub fn time_expired(&self, elapsed: Duration) -> bool {
        self.settings
            .time_limit
            .is_some_and(|limit| elapsed >= limit)
    }

    /// A component failed.
    pub fn fail(&mut self, error: &LoaError, iteration: usize) -> Termination {
        self.finish(Termination::Error {
            iteration,
            component: error.component(),
            cause: error.to_string(),
        })
    }

    fn check_bounds(&mut self, progress: &Progress) -> Option<Termination> {
        let incumbent = progress.incumbent?;
        if !self.bounds_crossed(progress.best_bound, incumbent) {
            return None;
        }
        Some(self.finish(Termination::Converged {
            iteration: progress.iteration,
            cause: format!(
                "bound {} reached incumbent {} (gap {:.3e})",
                progress.best_bound,
                incumbent,
                self.gap(progress.best_bound, incumbent)
            ),
        }))
    }

    fn check_iterations(&mut self, progress: &Progress) -> Option<Termination> {
        if progress.iteration < self.settings.iteration_limit {
            return None;
        }
        Some(self.finish(Termination::IterationLimit {
            iteration: progress.iteration,
        }))
    }

    fn check_time(&mut self, progress: &Progress) -> Option<Termination> {
        if !self.time_expired(progress.elapsed) {
            return None;
        }
        Some(self.finish(Termination::TimeLimit {
            iteration: progress.iteration,
            elapsed: progress.elapsed,
        }))
    }

    fn finish(&mut self, termination: Termination) -> Termination {
        self.state = termination.state();
        info!(state = %self.state, iteration = termination.iteration(), "{termination}");
        termination
    }
}

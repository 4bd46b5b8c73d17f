//! Iteration driver for logic-based outer approximation.
//!
//! One iteration:
//!
//! 1. Install the penalized objective on the master and solve it.
//! 2. Stop if the master is infeasible (exhausted), stopped on a limit,
//!    failed, or already closed the gap; otherwise take its discrete
//!    assignment.
//! 3. Fix the assignment on the subproblem, solve it, release the fixing.
//! 4. Feasible subproblem: update the incumbent and add OA cuts.
//! 5. Always add the integer cut excluding the assignment.
//! 6. Stop on bound crossing, the iteration limit, or the time limit.
//!
//! The driver is the only place iteration counters and timings change.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::callback::{LoaCallbacks, MasterSolveEvent, NoCallbacks, SubproblemSolveEvent};
use super::config::LoaConfig;
use super::cuts::CutGenerator;
use super::master::{MasterProblemManager, MasterSettings};
use super::subproblem::{SubproblemManager, SubproblemResult};
use super::termination::{Progress, TerminationEvaluator, TerminationSettings};
use crate::adapter::SolverRegistry;
use crate::domain::{
    Cut, Incumbent, IterationCounters, LoaResult, MasterModel, ProblemSnapshot, SubproblemModel,
    Termination, Timing, VarId,
};
use crate::error::{Component, ConfigError, LoaError, ModelError, Result};
use crate::port::{MilpSolver, MilpStatus, NlpSolver};

/// Logic-based outer approximation solver.
///
/// Cheap to clone; adapters are shared.
#[derive(Clone)]
pub struct LoaSolver {
    config: LoaConfig,
    milp: Arc<dyn MilpSolver>,
    nlp: Arc<dyn NlpSolver>,
}

impl LoaSolver {
    /// Create a solver from explicit adapters.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new(
        config: LoaConfig,
        milp: Arc<dyn MilpSolver>,
        nlp: Arc<dyn NlpSolver>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, milp, nlp })
    }

    /// Create a solver resolving the configured selectors in `registry`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid or a
    /// selector is not registered.
    pub fn from_registry(
        config: LoaConfig,
        registry: &SolverRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let milp = registry.milp(&config.mip_solver)?;
        let nlp = registry.nlp(&config.nlp_solver)?;
        Ok(Self { config, milp, nlp })
    }

    #[must_use]
    pub const fn config(&self) -> &LoaConfig {
        &self.config
    }

    /// Run the decomposition to a terminal state.
    ///
    /// `master` is the reformulated MILP with an active objective;
    /// `subproblem` holds the nonlinear constraints. Their leading variables
    /// must correspond one to one.
    ///
    /// Failures inside the loop end the run with
    /// [`Termination::Error`]; they are not returned as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two models do not fit together.
    pub fn solve(&self, master: MasterModel, subproblem: SubproblemModel) -> Result<LoaResult> {
        self.solve_with_callbacks(master, subproblem, &mut NoCallbacks)
    }

    /// [`solve`](Self::solve) with observation hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the two models do not fit together.
    pub fn solve_with_callbacks(
        &self,
        master: MasterModel,
        subproblem: SubproblemModel,
        callbacks: &mut dyn LoaCallbacks,
    ) -> Result<LoaResult> {
        check_alignment(&master, &subproblem)?;

        let discrete: Vec<VarId> = subproblem.binary_variables().collect();
        let settings = MasterSettings {
            penalty_factor: self.config.oa_penalty_factor,
            oa_slacks: self.config.oa_slacks,
            big_m: self.config.big_m,
            integer_tolerance: self.config.integer_tolerance,
        };
        let mut master = MasterProblemManager::new(master, discrete, settings)?;
        let mut subproblem = SubproblemManager::new(subproblem);

        info!(
            mip_solver = self.milp.name(),
            nlp_solver = self.nlp.name(),
            variables = subproblem.model().num_variables(),
            disjuncts = subproblem.model().list_disjuncts().len(),
            "starting logic-based outer approximation"
        );

        Ok(self.run(&mut master, &mut subproblem, callbacks))
    }

    fn run(
        &self,
        master: &mut MasterProblemManager,
        subproblem: &mut SubproblemManager,
        callbacks: &mut dyn LoaCallbacks,
    ) -> LoaResult {
        let start = Instant::now();
        let sense = master.sense();
        let generator = CutGenerator::new(sense, self.config.zero_tolerance);
        let mut evaluator = TerminationEvaluator::new(
            sense,
            TerminationSettings {
                iteration_limit: self.config.iteration_limit,
                absolute_gap_tolerance: self.config.absolute_gap_tolerance,
                relative_gap_tolerance: self.config.relative_gap_tolerance,
                time_limit: self.config.time_limit(),
            },
        );
        let mut counters = IterationCounters::default();
        let mut timing = Timing::default();
        let mut incumbent: Option<Incumbent> = None;

        let progress = |counters: &IterationCounters,
                        master: &MasterProblemManager,
                        incumbent: &Option<Incumbent>| Progress {
            iteration: counters.master_iteration,
            best_bound: master.best_bound(),
            incumbent: incumbent.as_ref().map(|i| i.objective),
            elapsed: start.elapsed(),
        };

        let termination = loop {
            // ====================================================================
            // Master problem
            // ====================================================================
            counters.mip_iteration += 1;
            if let Err(e) = master.install_objective(counters.master_iteration + 1) {
                break evaluator.fail(&LoaError::from(e), counters.master_iteration);
            }

            let options = self.config.mip_options.to_options(self.remaining(start));
            let started = Instant::now();
            let solved = master.solve(self.milp.as_ref(), &options);
            timing.mip += started.elapsed();

            let solved = match solved {
                Ok(solved) => solved,
                Err(e) => {
                    let error = failure(Component::MasterProblem, counters.master_iteration, e);
                    break evaluator.fail(&error, counters.master_iteration);
                }
            };

            callbacks.after_master_solve(&MasterSolveEvent {
                counters,
                result: &solved,
                best_bound: master.best_bound(),
                model: master.model(),
            });

            let assignment = match (solved.status, solved.assignment) {
                (MilpStatus::Optimal, Some(assignment)) => assignment,
                (MilpStatus::Infeasible, _) => {
                    if let Some(best) = &incumbent {
                        master.close_bound(best.objective);
                    }
                    break evaluator.master_infeasible(&progress(&counters, master, &incumbent));
                }
                (MilpStatus::TimeLimit, _) => {
                    break evaluator.master_limit(&progress(&counters, master, &incumbent));
                }
                // A backend failing once the budget is spent ran out of time.
                (MilpStatus::Error, _) if evaluator.time_expired(start.elapsed()) => {
                    break evaluator.master_limit(&progress(&counters, master, &incumbent));
                }
                (status, _) => {
                    let error = failure(
                        Component::MasterProblem,
                        counters.master_iteration,
                        format!("MILP solver returned status {status:?}"),
                    );
                    break evaluator.fail(&error, counters.master_iteration);
                }
            };

            counters.master_iteration += 1;
            let iteration = counters.master_iteration;

            if master.is_explored(&assignment) {
                let error = LoaError::DuplicateAssignment {
                    iteration,
                    assignment,
                };
                break evaluator.fail(&error, iteration);
            }

            info!(
                iteration,
                master_objective = solved.objective,
                original_objective = solved.original_objective,
                best_bound = master.best_bound(),
                incumbent = ?incumbent.as_ref().map(|i| i.objective),
                assignment = %assignment,
                "master iteration"
            );

            if let Some(done) = evaluator.after_master(&progress(&counters, master, &incumbent)) {
                break done;
            }

            // ====================================================================
            // Subproblem
            // ====================================================================
            counters.nlp_iteration += 1;
            let options = self.config.nlp_options.to_options(self.remaining(start));
            let started = Instant::now();
            let result = subproblem.solve(&assignment, self.nlp.as_ref(), &options);
            timing.nlp += started.elapsed();

            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    let error = failure(Component::Subproblem, iteration, e);
                    break evaluator.fail(&error, iteration);
                }
            };

            // ====================================================================
            // Cuts
            // ====================================================================
            let mut oa_cuts_added = 0;
            if result.feasible {
                update_incumbent(&mut incumbent, &result, sense, iteration);
                match add_oa_cuts(&generator, master, subproblem.model(), &result, iteration) {
                    Ok(added) => oa_cuts_added = added,
                    Err(error) => break evaluator.fail(&error, iteration),
                }
            }

            let integer_cut = generator.generate_integer_cut(&assignment, result.feasible, iteration);
            if let Err(e) = master.add_cut(integer_cut) {
                let error = failure(Component::CutGenerator, iteration, e);
                break evaluator.fail(&error, iteration);
            }

            debug!(
                iteration,
                feasible = result.feasible,
                status = ?result.status,
                oa_cuts_added,
                "subproblem processed"
            );

            callbacks.after_subproblem_solve(&SubproblemSolveEvent {
                counters,
                result: &result,
                incumbent: incumbent.as_ref(),
                oa_cuts_added,
                model: subproblem.model(),
            });

            if let Some(done) = evaluator.after_subproblem(&progress(&counters, master, &incumbent)) {
                break done;
            }
        };

        timing.total = start.elapsed();
        self.finish(termination, incumbent, master, counters, timing)
    }

    fn finish(
        &self,
        termination: Termination,
        incumbent: Option<Incumbent>,
        master: &MasterProblemManager,
        counters: IterationCounters,
        timing: Timing,
    ) -> LoaResult {
        info!(
            state = %termination.state(),
            master_iterations = counters.master_iteration,
            mip_iterations = counters.mip_iteration,
            nlp_iterations = counters.nlp_iteration,
            objective = ?incumbent.as_ref().map(|i| i.objective),
            best_bound = master.best_bound(),
            total_secs = timing.total.as_secs_f64(),
            mip = self.milp.name(),
            "logic-based outer approximation finished"
        );
        LoaResult {
            termination,
            incumbent,
            best_bound: master.best_bound(),
            counters,
            timing,
            oa_cuts: master.num_oa_cuts(),
            integer_cuts: master.num_integer_cuts(),
        }
    }

    fn remaining(&self, start: Instant) -> Option<Duration> {
        self.config
            .time_limit()
            .map(|limit| limit.saturating_sub(start.elapsed()))
    }
}

fn failure(component: Component, iteration: usize, error: impl std::fmt::Display) -> LoaError {
    LoaError::SolverFailure {
        component,
        iteration,
        message: error.to_string(),
    }
}

fn update_incumbent(
    incumbent: &mut Option<Incumbent>,
    result: &SubproblemResult,
    sense: crate::domain::Sense,
    iteration: usize,
) {
    let Some(objective) = result.objective else {
        return;
    };
    let improves = incumbent
        .as_ref()
        .map_or(true, |best| sense.is_better(objective, best.objective));
    if improves {
        info!(iteration, objective, "new incumbent");
        *incumbent = Some(Incumbent {
            objective,
            values: result.values.clone(),
            iteration,
        });
    }
}

fn add_oa_cuts(
    generator: &CutGenerator,
    master: &mut MasterProblemManager,
    model: &SubproblemModel,
    result: &SubproblemResult,
    iteration: usize,
) -> std::result::Result<usize, LoaError> {
    let cuts = generator.generate_oa_cuts(result, model, iteration)?;
    let count = cuts.len();
    for cut in cuts {
        master
            .add_cut(Cut::OuterApproximation(cut))
            .map_err(|e| failure(Component::CutGenerator, iteration, e))?;
    }
    Ok(count)
}

/// The master's leading variables must mirror the subproblem's, and both
/// models must optimize in the same direction.
fn check_alignment(
    master: &MasterModel,
    subproblem: &SubproblemModel,
) -> std::result::Result<(), ModelError> {
    let snapshot = ProblemSnapshot::capture(master)?;
    if snapshot.sense() != subproblem.sense() {
        return Err(ModelError::SenseMismatch {
            master: snapshot.sense(),
            subproblem: subproblem.sense(),
        });
    }

    if master.num_variables() < subproblem.num_variables() {
        return Err(ModelError::MissingVariables {
            master: master.num_variables(),
            subproblem: subproblem.num_variables(),
        });
    }

    for (index, (m, s)) in master
        .list_variables()
        .iter()
        .zip(subproblem.list_variables())
        .enumerate()
    {
        if m.name != s.name {
            return Err(ModelError::VariableMismatch {
                index,
                master: m.name.clone(),
                subproblem: s.name.clone(),
            });
        }
        if s.is_binary() && !m.is_binary() {
            return Err(ModelError::NotBinary {
                var: VarId::new(index),
            });
        }
    }
    Ok(())
}

//! HiGHS master-problem solver via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming solver.
//! This implementation wraps it using the good_lp crate for ergonomic Rust usage.
//! The good_lp problem is rebuilt from the [`MasterModel`] on every call, so the
//! master can keep growing between solves.

use good_lp::solvers::highs::highs;
use good_lp::solvers::{SolutionStatus, WithMipGap, WithTimeLimit};
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable as LpVariable,
};
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::{ConstraintSense, LinearExpr, MasterModel, Sense};
use crate::error::{ModelError, Result, SolverError};
use crate::port::{MilpSolution, MilpSolver, MilpStatus, SolveOptions};

const NAME: &str = "highs";

/// HiGHS-based MILP solver.
#[derive(Debug, Default, Clone)]
pub struct HighsMilpSolver;

impl HighsMilpSolver {
    /// Create a new HiGHS solver instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MilpSolver for HighsMilpSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve_milp(&self, model: &MasterModel, options: &SolveOptions) -> Result<MilpSolution> {
        solve_with_good_lp(model, options)
    }
}

fn to_expression(expr: &LinearExpr, columns: &[LpVariable]) -> Expression {
    let linear: Expression = expr
        .terms()
        .iter()
        .map(|(v, c)| *c * columns[v.index()])
        .sum();
    linear + expr.constant_term()
}

/// Internal solver implementation using good_lp.
fn solve_with_good_lp(model: &MasterModel, options: &SolveOptions) -> Result<MilpSolution> {
    let (_, objective) = model
        .active_objective()
        .ok_or(ModelError::NoActiveObjective)?;
    let n = model.num_variables();

    // Handle empty problem
    if n == 0 {
        return Ok(MilpSolution {
            status: MilpStatus::Optimal,
            objective: objective.expr.constant_term(),
            values: vec![],
        });
    }

    // Create variables
    let mut vars = variables!();
    let mut columns = Vec::with_capacity(n);

    for var in model.list_variables() {
        let mut v = variable();

        if let Some(lb) = var.bounds.lower {
            v = v.min(lb);
        }
        if let Some(ub) = var.bounds.upper {
            v = v.max(ub);
        }
        if var.is_binary() {
            v = v.integer();
        }

        columns.push(vars.add(v));
    }

    let goal = to_expression(&objective.expr, &columns);
    let problem = match objective.sense {
        Sense::Minimize => vars.minimise(goal),
        Sense::Maximize => vars.maximise(goal),
    };
    let mut lp = problem.using(highs);

    if let Some(limit) = options.time_limit {
        lp = lp.with_time_limit(limit.as_secs_f64());
    }
    if let Some(gap) = options.relative_gap {
        #[allow(clippy::cast_possible_truncation)]
        let gap = gap as f32;
        lp = lp
            .with_mip_gap(gap)
            .map_err(|e| SolverError::new(NAME, e.to_string()))?;
    }

    for row in model.list_constraints() {
        let lhs = to_expression(&row.expr, &columns);
        let rhs = row.rhs;

        match row.sense {
            ConstraintSense::GreaterEqual => {
                lp = lp.with(constraint!(lhs >= rhs));
            }
            ConstraintSense::LessEqual => {
                lp = lp.with(constraint!(lhs <= rhs));
            }
            ConstraintSense::Equal => {
                lp = lp.with(constraint!(lhs == rhs));
            }
        }
    }

    debug!(
        variables = n,
        constraints = model.num_constraints(),
        "solving master with HiGHS"
    );

    let started = Instant::now();
    match lp.solve() {
        Ok(solution) => {
            let status = status_of(solution.status());
            let values: Vec<f64> = columns.iter().map(|c| solution.value(*c)).collect();

            // Re-evaluate objective with the solved values
            let objective_value = objective.expr.evaluate(&values);
            if status != MilpStatus::Optimal {
                warn!(objective = objective_value, "HiGHS stopped on a limit with an unproven point");
            }

            Ok(MilpSolution {
                status,
                objective: objective_value,
                values,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(MilpSolution::with_status(MilpStatus::Infeasible)),
        Err(ResolutionError::Unbounded) => Ok(MilpSolution::with_status(MilpStatus::Unbounded)),
        Err(other) if limit_expired(options, started) => {
            warn!(error = %other, "HiGHS reached its time limit without a solution");
            Ok(MilpSolution::with_status(MilpStatus::TimeLimit))
        }
        Err(other) => {
            warn!(error = %other, "HiGHS did not return a solution");
            Ok(MilpSolution::with_status(MilpStatus::Error))
        }
    }
}

/// A gap-limited solve is optimal within the requested gap; any other early
/// stop leaves the point unproven.
fn status_of(status: SolutionStatus) -> MilpStatus {
    match status {
        SolutionStatus::Optimal | SolutionStatus::GapLimit => MilpStatus::Optimal,
        SolutionStatus::TimeLimit => MilpStatus::TimeLimit,
    }
}

fn limit_expired(options: &SolveOptions, started: Instant) -> bool {
    options
        .time_limit
        .is_some_and(|limit| started.elapsed() >= limit)
}

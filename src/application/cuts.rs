//! Cut generation from subproblem solutions.
//!
//! For a feasible subproblem point `x*`, every active nonlinear constraint
//! `l <= g(x) <= u` with a reported gradient yields the first-order cut
//!
//! ```text
//! g(x*) + grad g(x*) . (x - x*)  <=  u      (upper side)
//! g(x*) + grad g(x*) . (x - x*)  >=  l      (lower side)
//! ```
//!
//! Two-sided constraints (equalities and ranges) are linearized on the side
//! their multiplier points to: a positive multiplier selects the upper side
//! under minimization and the lower side under maximization. Without a
//! usable multiplier no cut is produced for them.
//!
//! Every explored assignment, feasible or not, is excluded by a no-good cut.

use tracing::debug;

use super::subproblem::SubproblemResult;
use crate::domain::{
    Assignment, Cut, CutDirection, CutScope, IntegerCut, LinearExpr, NonlinearConstraint, OaCut,
    Sense, SubproblemModel,
};
use crate::error::{Component, LoaError};
use crate::port::ConstraintLinearization;

#[derive(Debug, Clone, Copy)]
pub struct CutGenerator {
    sense: Sense,
    zero_tolerance: f64,
}

impl CutGenerator {
    #[must_use]
    pub const fn new(sense: Sense, zero_tolerance: f64) -> Self {
        Self {
            sense,
            zero_tolerance,
        }
    }

    /// Outer-approximation cuts at a feasible subproblem point.
    ///
    /// Linearizations of constraints that were not active under the
    /// subproblem's assignment are ignored.
    ///
    /// # Errors
    ///
    /// Fails if `result` is infeasible or a linearization names a constraint
    /// the subproblem does not have.
    pub fn generate_oa_cuts(
        &self,
        result: &SubproblemResult,
        model: &SubproblemModel,
        iteration: usize,
    ) -> Result<Vec<OaCut>, LoaError> {
        if !result.feasible {
            return Err(LoaError::SolverFailure {
                component: Component::CutGenerator,
                iteration,
                message: "outer-approximation cuts requested for an infeasible subproblem".into(),
            });
        }

        let mut cuts = Vec::with_capacity(result.linearizations.len());
        for linearization in &result.linearizations {
            let constraint = model.constraint(linearization.constraint).ok_or_else(|| {
                LoaError::SolverFailure {
                    component: Component::CutGenerator,
                    iteration,
                    message: format!("linearization for unknown constraint {}", linearization.constraint),
                }
            })?;

            let Some(scope) = self.scope(constraint, model, &result.assignment) else {
                continue;
            };

            let expr = self.tangent(linearization, &result.values, iteration)?;
            if expr.terms().is_empty() {
                debug!(constraint = %constraint.name, "flat linearization, no cut");
                continue;
            }

            for (direction, rhs) in self.sides(constraint, linearization) {
                cuts.push(OaCut {
                    source: linearization.constraint,
                    expr: expr.clone(),
                    direction,
                    rhs,
                    scope,
                    iteration,
                });
            }
        }

        debug!(iteration, cuts = cuts.len(), "generated OA cuts");
        Ok(cuts)
    }

    /// No-good cut excluding `assignment`.
    #[must_use]
    pub fn generate_integer_cut(&self, assignment: &Assignment, feasible: bool, iteration: usize) -> Cut {
        Cut::Integer(IntegerCut {
            excluded: assignment.clone(),
            feasible,
            iteration,
        })
    }

    /// `g(x*) + sum_j dg/dx_j (x_j - x*_j)`, tiny coefficients dropped.
    fn tangent(
        &self,
        linearization: &ConstraintLinearization,
        point: &[f64],
        iteration: usize,
    ) -> Result<LinearExpr, LoaError> {
        let mut expr = LinearExpr::constant(linearization.value);
        for (var, grad) in &linearization.gradient {
            let at = point.get(var.index()).copied().ok_or_else(|| LoaError::SolverFailure {
                component: Component::CutGenerator,
                iteration,
                message: format!(
                    "gradient of constraint {} names variable {var} outside the {}-value point",
                    linearization.constraint,
                    point.len()
                ),
            })?;
            expr.add_term(*var, *grad);
            expr.add_constant(-grad * at);
        }
        Ok(expr.compact(self.zero_tolerance))
    }

    fn scope(
        &self,
        constraint: &NonlinearConstraint,
        model: &SubproblemModel,
        assignment: &Assignment,
    ) -> Option<CutScope> {
        let Some(disjunct) = constraint.disjunct else {
            return Some(CutScope::Global);
        };
        let indicator = model.disjunct(disjunct)?.indicator;
        if assignment.get(indicator) == Some(true) {
            Some(CutScope::Disjunct {
                disjunct,
                indicator,
            })
        } else {
            debug!(constraint = %constraint.name, "constraint of inactive disjunct, no cut");
            None
        }
    }

    fn sides(
        &self,
        constraint: &NonlinearConstraint,
        linearization: &ConstraintLinearization,
    ) -> Vec<(CutDirection, f64)> {
        match (constraint.lower, constraint.upper) {
            (None, None) => Vec::new(),
            (None, Some(upper)) => vec![(CutDirection::Upper, upper)],
            (Some(lower), None) => vec![(CutDirection::Lower, lower)],
            (Some(lower), Some(upper)) => {
                let dual = linearization
                    .dual
                    .filter(|d| d.is_finite() && d.abs() > self.zero_tolerance);
                let Some(dual) = dual else {
                    debug!(constraint = %constraint.name, "two-sided constraint without multiplier, no cut");
                    return Vec::new();
                };
                if dual * self.sense.penalty_sign() > 0.0 {
                    vec![(CutDirection::Upper, upper)]
                } else {
                    vec![(CutDirection::Lower, lower)]
                }
            }
        }
    }
}

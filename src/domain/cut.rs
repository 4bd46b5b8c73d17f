//! Cuts accumulated by the master problem.
//!
//! Cuts are append-only: once inserted they are never edited or removed, so
//! the master's feasible region only shrinks from one iteration to the next.

use serde::Serialize;

use super::assignment::Assignment;
use super::constraint::LinearConstraint;
use super::expression::LinearExpr;
use super::id::{DisjunctId, NlConstraintId, VarId};

/// Side of a nonlinear constraint a linearization supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CutDirection {
    /// `expr <= rhs`
    Upper,
    /// `expr >= rhs`
    Lower,
}

/// Where an outer-approximation cut is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutScope {
    /// The source constraint is global; the cut always holds.
    Global,
    /// The cut holds only when the disjunct's indicator is one.
    Disjunct { disjunct: DisjunctId, indicator: VarId },
}

/// First-order linearization of a nonlinear constraint at a subproblem point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OaCut {
    /// Nonlinear constraint the cut was derived from.
    pub source: NlConstraintId,
    /// `g(x*) + grad g(x*) . (x - x*)`, constant included.
    pub expr: LinearExpr,
    pub direction: CutDirection,
    pub rhs: f64,
    pub scope: CutScope,
    /// Master iteration that produced the cut.
    pub iteration: usize,
}

impl OaCut {
    /// The cut as an unrelaxed linear constraint (no slack, no big-M).
    #[must_use]
    pub fn to_constraint(&self, name: impl Into<String>) -> LinearConstraint {
        match self.direction {
            CutDirection::Upper => LinearConstraint::leq(name, self.expr.clone(), self.rhs),
            CutDirection::Lower => LinearConstraint::geq(name, self.expr.clone(), self.rhs),
        }
    }
}

/// Exclusion of a previously explored discrete assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegerCut {
    pub excluded: Assignment,
    /// Whether the subproblem for this assignment was feasible.
    pub feasible: bool,
    pub iteration: usize,
}

impl IntegerCut {
    /// The no-good constraint `sum_{a=0} y - sum_{a=1} y >= 1 - |{a=1}|`.
    ///
    /// Every assignment except the excluded one satisfies it.
    #[must_use]
    pub fn to_constraint(&self, name: impl Into<String>) -> LinearConstraint {
        let mut expr = LinearExpr::new();
        let mut ones = 0_usize;
        for (var, value) in self.excluded.iter() {
            if value {
                ones += 1;
                expr.add_term(var, -1.0);
            } else {
                expr.add_term(var, 1.0);
            }
        }
        LinearConstraint::geq(name, expr, 1.0 - ones as f64)
    }
}

/// A cut added to the master problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cut {
    OuterApproximation(OaCut),
    Integer(IntegerCut),
}

impl Cut {
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }
}

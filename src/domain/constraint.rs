//! Linear constraint types for the master problem.
//!
//! These types represent the linear rows of the MILP master: the
//! reformulated disjunctive structure supplied by the caller plus every cut
//! the algorithm derives.

use serde::{Deserialize, Serialize};

use super::expression::LinearExpr;

/// A single linear constraint: `expr {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    /// Name for logging and debugging.
    pub name: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Constraint sense (>=, <=, =).
    pub sense: ConstraintSense,
    /// Right-hand side value.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Create a >= constraint.
    #[must_use]
    pub fn geq(name: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self::new(name, expr, ConstraintSense::GreaterEqual, rhs)
    }

    /// Create a <= constraint.
    #[must_use]
    pub fn leq(name: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self::new(name, expr, ConstraintSense::LessEqual, rhs)
    }

    /// Create an = constraint.
    #[must_use]
    pub fn eq(name: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self::new(name, expr, ConstraintSense::Equal, rhs)
    }

    /// Create a constraint, folding the expression's constant into the rhs.
    #[must_use]
    pub fn new(name: impl Into<String>, expr: LinearExpr, sense: ConstraintSense, rhs: f64) -> Self {
        let constant = expr.constant_term();
        let expr = expr.with_constant(-constant);
        Self {
            name: name.into(),
            expr,
            sense,
            rhs: rhs - constant,
        }
    }

    /// Amount by which the constraint is violated at `values` (zero if satisfied).
    #[must_use]
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            ConstraintSense::GreaterEqual => (self.rhs - lhs).max(0.0),
            ConstraintSense::LessEqual => (lhs - self.rhs).max(0.0),
            ConstraintSense::Equal => (lhs - self.rhs).abs(),
        }
    }

    /// Check satisfaction within `tol`.
    #[must_use]
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        self.violation(values) <= tol
    }
}

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Less than or equal (<=).
    LessEqual,
    /// Equal (=).
    Equal,
}

/// Bounds on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariableBounds {
    /// Lower bound (None = -infinity).
    pub lower: Option<f64>,
    /// Upper bound (None = +infinity).
    pub upper: Option<f64>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: None,
        }
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: Some(0.0),
            upper: Some(1.0),
        }
    }

    /// Free variable (no bounds).
    #[must_use]
    pub const fn free() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Non-negative variable [0, +inf).
    #[must_use]
    pub fn non_negative() -> Self {
        Self::default()
    }

    /// Bounded variable [lower, upper].
    #[must_use]
    pub const fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Whether `value` lies within the bounds, allowing `tol` slack.
    #[must_use]
    pub fn contains(&self, value: f64, tol: f64) -> bool {
        self.lower.map_or(true, |lb| value >= lb - tol)
            && self.upper.map_or(true, |ub| value <= ub + tol)
    }
}

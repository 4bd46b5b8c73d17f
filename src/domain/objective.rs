//! Objective functions and optimization sense.

use serde::{Deserialize, Serialize};

use super::expression::LinearExpr;

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    /// Return `true` if `candidate` is strictly better than `reference`.
    #[must_use]
    pub fn is_better(self, candidate: f64, reference: f64) -> bool {
        match self {
            Self::Minimize => candidate < reference,
            Self::Maximize => candidate > reference,
        }
    }

    /// Of two values, the better one.
    #[must_use]
    pub fn best(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) {
            b
        } else {
            a
        }
    }

    /// Of two values, the worse one.
    #[must_use]
    pub fn worst_of(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) {
            a
        } else {
            b
        }
    }

    /// Bound of a relaxation that has proven nothing yet.
    #[must_use]
    pub const fn relaxed_bound(self) -> f64 {
        match self {
            Self::Minimize => f64::NEG_INFINITY,
            Self::Maximize => f64::INFINITY,
        }
    }

    /// `+1` for minimize, `-1` for maximize.
    ///
    /// Multiplying a non-negative penalty by this sign always worsens the
    /// objective.
    #[must_use]
    pub const fn penalty_sign(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }
}

/// A linear objective.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Objective {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
}

impl Objective {
    #[must_use]
    pub fn new(name: impl Into<String>, expr: LinearExpr, sense: Sense) -> Self {
        Self {
            name: name.into(),
            expr,
            sense,
        }
    }

    #[must_use]
    pub fn minimize(name: impl Into<String>, expr: LinearExpr) -> Self {
        Self::new(name, expr, Sense::Minimize)
    }

    #[must_use]
    pub fn maximize(name: impl Into<String>, expr: LinearExpr) -> Self {
        Self::new(name, expr, Sense::Maximize)
    }
}

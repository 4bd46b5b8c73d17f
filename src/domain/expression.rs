//! Affine expressions over model variables.

use std::fmt;

use serde::Serialize;

use super::constraint::VariableBounds;
use super::id::VarId;

/// An affine expression `sum(coef * x) + constant`.
///
/// Terms are kept in insertion order; the same variable may appear more than
/// once until [`LinearExpr::compact`] merges them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// The zero expression.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            terms: Vec::new(),
            constant: 0.0,
        }
    }

    /// A constant expression.
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Build from `(variable, coefficient)` pairs.
    pub fn from_terms(terms: impl IntoIterator<Item = (VarId, f64)>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            constant: 0.0,
        }
    }

    /// A single variable with coefficient one.
    #[must_use]
    pub fn var(var: VarId) -> Self {
        Self::from_terms([(var, 1.0)])
    }

    /// Add `coef * var` in place.
    pub fn add_term(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    /// Add a constant in place.
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Builder form of [`LinearExpr::add_term`].
    #[must_use]
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Builder form of [`LinearExpr::add_constant`].
    #[must_use]
    pub fn with_constant(mut self, value: f64) -> Self {
        self.add_constant(value);
        self
    }

    #[must_use]
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    #[must_use]
    pub const fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Return `self + other`.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        terms.extend_from_slice(&other.terms);
        Self {
            terms,
            constant: self.constant + other.constant,
        }
    }

    /// Return `factor * self`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|(v, c)| (*v, c * factor)).collect(),
            constant: self.constant * factor,
        }
    }

    /// Merge repeated variables and drop coefficients with `|c| <= tolerance`.
    #[must_use]
    pub fn compact(&self, tolerance: f64) -> Self {
        let mut merged: Vec<(VarId, f64)> = Vec::with_capacity(self.terms.len());
        for (var, coef) in &self.terms {
            match merged.iter_mut().find(|(v, _)| v == var) {
                Some((_, c)) => *c += coef,
                None => merged.push((*var, *coef)),
            }
        }
        merged.retain(|(_, c)| c.abs() > tolerance);
        Self {
            terms: merged,
            constant: self.constant,
        }
    }

    /// Largest variable index referenced, if any.
    #[must_use]
    pub fn max_var(&self) -> Option<VarId> {
        self.terms.iter().map(|(v, _)| *v).max()
    }

    /// Evaluate at a dense point indexed by [`VarId`]. Missing entries count as zero.
    #[must_use]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    /// Interval `[min, max]` of the expression over the given variable bounds.
    ///
    /// Unbounded directions yield infinite ends.
    #[must_use]
    pub fn range(&self, bounds: impl Fn(VarId) -> VariableBounds) -> (f64, f64) {
        let mut lo = self.constant;
        let mut hi = self.constant;
        for (var, coef) in &self.terms {
            if *coef == 0.0 {
                continue;
            }
            let b = bounds(*var);
            let lower = b.lower.unwrap_or(f64::NEG_INFINITY);
            let upper = b.upper.unwrap_or(f64::INFINITY);
            if *coef >= 0.0 {
                lo += coef * lower;
                hi += coef * upper;
            } else {
                lo += coef * upper;
                hi += coef * lower;
            }
        }
        (lo, hi)
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (var, coef) in &self.terms {
            if first {
                write!(f, "{coef}*{var}")?;
                first = false;
            } else if *coef < 0.0 {
                write!(f, " - {}*{var}", -coef)?;
            } else {
                write!(f, " + {coef}*{var}")?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

//! Discrete assignments extracted from master solutions.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::id::VarId;

/// Values of every binary variable at a master solution.
///
/// Compared and hashed by value, so two master solutions selecting the same
/// disjuncts produce equal assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Assignment(BTreeMap<VarId, bool>);

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Round each listed variable's value at 0.5.
    pub fn from_values(vars: impl IntoIterator<Item = VarId>, values: &[f64]) -> Self {
        vars.into_iter()
            .map(|v| (v, values.get(v.index()).copied().unwrap_or(0.0) >= 0.5))
            .collect()
    }

    pub fn insert(&mut self, var: VarId, value: bool) -> Option<bool> {
        self.0.insert(var, value)
    }

    #[must_use]
    pub fn get(&self, var: VarId) -> Option<bool> {
        self.0.get(&var).copied()
    }

    /// Iterate `(variable, value)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, bool)> + '_ {
        self.0.iter().map(|(v, b)| (*v, *b))
    }

    /// Variables set to one.
    pub fn ones(&self) -> impl Iterator<Item = VarId> + '_ {
        self.iter().filter(|(_, b)| *b).map(|(v, _)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(VarId, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (VarId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var}={}", u8::from(value))?;
        }
        f.write_str("}")
    }
}

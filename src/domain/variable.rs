//! Decision variables shared by the master and subproblem models.

use serde::{Deserialize, Serialize};

use super::constraint::VariableBounds;

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Real-valued.
    Continuous,
    /// Takes values in {0, 1}. Disjunct indicators are binary.
    Binary,
}

/// A model variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Name, unique within its model.
    pub name: String,
    /// Continuous or binary.
    pub kind: VariableKind,
    /// Lower and upper bounds.
    pub bounds: VariableBounds,
    /// Current value (initial point for the subproblem).
    pub value: Option<f64>,
    /// Whether the value is fixed.
    pub fixed: bool,
}

impl Variable {
    /// Continuous variable with the given bounds.
    #[must_use]
    pub fn continuous(name: impl Into<String>, bounds: VariableBounds) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Continuous,
            bounds,
            value: None,
            fixed: false,
        }
    }

    /// Binary variable.
    #[must_use]
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Binary,
            bounds: VariableBounds::binary(),
            value: None,
            fixed: false,
        }
    }

    /// Set the initial value.
    #[must_use]
    pub const fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self.kind, VariableKind::Binary)
    }
}

//! Disjuncts and their indicator variables.

use serde::Serialize;

use super::id::VarId;

/// One branch of a disjunction, selected by a binary indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disjunct {
    pub name: String,
    /// Binary variable that is 1 when this disjunct is selected.
    pub indicator: VarId,
}

impl Disjunct {
    #[must_use]
    pub fn new(name: impl Into<String>, indicator: VarId) -> Self {
        Self {
            name: name.into(),
            indicator,
        }
    }
}

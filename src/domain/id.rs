//! Dense index identifiers for model components.
//!
//! Every component of the working models lives in an ordered collection and is
//! addressed by its position. The newtypes keep a variable index from being
//! used where a constraint index is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(usize);

        impl $name {
            /// Create an identifier from its position in the owning collection.
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Position in the owning collection.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::new(index)
            }
        }
    };
}

index_id!(
    /// Variable identifier.
    VarId,
    "x"
);

index_id!(
    /// Linear constraint identifier in the master model.
    ConstraintId,
    "c"
);

index_id!(
    /// Nonlinear constraint identifier in the subproblem model.
    NlConstraintId,
    "g"
);

index_id!(
    /// Disjunct identifier.
    DisjunctId,
    "d"
);

index_id!(
    /// Objective identifier in the master model.
    ObjectiveId,
    "obj"
);

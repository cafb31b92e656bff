//! Polyhedral algebra objects.
//!
//! This module is the boundary with the external integer-set algebra engine:
//! it owns the object representations (spaces, affine functions, constraints,
//! sets, maps, schedule trees) and the structural operations the scop builder
//! needs to construct them. Rescheduling algorithms live behind this boundary
//! and are not part of this crate.

pub mod aff;
pub mod constraint;
pub mod context;
pub mod map;
pub mod schedule;
pub mod set;
pub mod space;

pub use aff::Aff;
pub use constraint::{Constraint, ConstraintKind, ConstraintSystem};
pub use context::Ctx;
pub use map::Map;
pub use schedule::ScheduleTree;
pub use set::Set;
pub use space::Space;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named identifier for tuples: statements, tensors, relation ids and
/// coordinate dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(pub String);

impl Id {
    /// Create an identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a suffixed identifier, e.g. `A` with suffix 1 becomes `A_1`.
    pub fn with_suffix(&self, suffix: usize) -> Self {
        Self(format!("{}_{}", self.0, suffix))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_suffix() {
        let id = Id::new("A");
        assert_eq!(id.with_suffix(1).as_str(), "A_1");
        assert_eq!(id.with_suffix(12).to_string(), "A_12");
    }
}

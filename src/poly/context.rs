//! Algebra context.
//!
//! Every object built for one compilation unit is anchored to a `Ctx`. The
//! context is passed explicitly and never mutated once statement processing
//! has begun, which keeps the builder reentrant across independent
//! compilation units.

use serde::{Deserialize, Serialize};

/// Context for one compilation unit's algebra objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ctx {
    /// Maximum number of distinct accesses to one tensor within a single
    /// statement before suffix disambiguation is considered exhausted.
    pub max_access_suffix: usize,
}

impl Ctx {
    /// Create a context with default limits.
    pub fn new() -> Self {
        Self {
            max_access_suffix: 16,
        }
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

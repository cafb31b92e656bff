//! Error types for scop construction.
//!
//! The taxonomy mirrors the failure policy of the builder: affine-translation
//! and bound errors are fatal for the compilation unit, while classification
//! problems never surface here at all (they degrade to an opaque category and
//! are only logged).

use thiserror::Error;

/// Errors produced while building the polyhedral model of a compilation unit.
///
/// Every variant is fatal for the enclosing `make_schedule_tree` call: a
/// static-control-part model is all-or-nothing, so no partial schedule tree
/// is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopError {
    /// An expression expected to be exactly affine contains a non-linear or
    /// unanalyzable term. Raised by the exact and checked translator modes;
    /// the tolerant bounds mode drops the offending subterm instead.
    #[error("expression is not affine: {expr}")]
    NonAffine {
        /// Rendering of the offending expression.
        expr: String,
    },

    /// A loop bound could not be approximated even conservatively: the
    /// tolerant translator dropped every candidate. No iteration domain can
    /// be built for the surrounding nest.
    #[error("loop bound for `{var}` cannot be approximated: {bound}")]
    UnrepresentableBound {
        /// The loop variable whose bound failed.
        var: String,
        /// Rendering of the bound expression.
        bound: String,
    },

    /// Distinct accesses to one tensor within a single statement exhausted
    /// the suffixing scheme, so the accesses can no longer be disambiguated
    /// consistently.
    #[error("tensor `{tensor}` has {count} distinct accesses in one statement (limit {limit})")]
    DuplicateAccessConflict {
        /// The tensor whose accesses collided.
        tensor: String,
        /// Number of distinct accesses seen so far.
        count: usize,
        /// The configured suffix limit.
        limit: usize,
    },
}

/// Result type used throughout scop construction.
pub type ScopResult<T> = Result<T, ScopError>;

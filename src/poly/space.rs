//! Spaces anchor every domain, relation and affine function to a common set
//! of named dimensions.
//!
//! A compilation unit owns one parameter space (one dimension per symbolic
//! scalar). Instance spaces and access-map spaces are derived from it and
//! share its parameter dimensions; the parameter order never changes after
//! construction, so affine functions referencing the same parameter names
//! always land in matching spaces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A polyhedral space: named set/input/output and parameter dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Number of set (or map output) dimensions.
    pub n_dim: usize,
    /// Number of map input dimensions (zero for set spaces).
    pub n_in: usize,
    /// Names of the set/output dimensions.
    pub dim_names: Vec<String>,
    /// Names of the map input dimensions.
    pub in_names: Vec<String>,
    /// Names of the parameter dimensions.
    pub param_names: Vec<String>,
}

impl Space {
    /// Create a pure parameter space (no set dimensions).
    pub fn params(param_names: Vec<String>) -> Self {
        Self {
            n_dim: 0,
            n_in: 0,
            dim_names: Vec::new(),
            in_names: Vec::new(),
            param_names,
        }
    }

    /// Derive a set space over the same parameters, with one dimension per
    /// given name (outermost loop first).
    pub fn instance(&self, dim_names: Vec<String>) -> Self {
        Self {
            n_dim: dim_names.len(),
            n_in: 0,
            dim_names,
            in_names: Vec::new(),
            param_names: self.param_names.clone(),
        }
    }

    /// Derive a map space over the same parameters. Inputs are this space's
    /// set dimensions; outputs are the given names.
    pub fn map_to(&self, out_names: Vec<String>) -> Self {
        debug_assert!(self.is_set());
        Self {
            n_dim: out_names.len(),
            n_in: self.n_dim,
            dim_names: out_names,
            in_names: self.dim_names.clone(),
            param_names: self.param_names.clone(),
        }
    }

    /// True if this is a pure parameter space.
    pub fn is_params(&self) -> bool {
        self.n_dim == 0 && self.n_in == 0
    }

    /// True if this is a set space.
    pub fn is_set(&self) -> bool {
        self.n_in == 0
    }

    /// True if this is a map space.
    pub fn is_map(&self) -> bool {
        self.n_in > 0
    }

    /// Number of set/output dimensions.
    pub fn dim(&self) -> usize {
        self.n_dim
    }

    /// Number of parameter dimensions.
    pub fn n_param(&self) -> usize {
        self.param_names.len()
    }

    /// Index of a set (or map input) dimension by name.
    pub fn dim_index(&self, name: &str) -> Option<usize> {
        if self.is_map() {
            self.in_names.iter().position(|n| n == name)
        } else {
            self.dim_names.iter().position(|n| n == name)
        }
    }

    /// Index of a parameter dimension by name.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.param_names.iter().position(|n| n == name)
    }

    /// Names of the dimensions affine functions over this space range over:
    /// map inputs for map spaces, set dimensions otherwise.
    pub fn domain_names(&self) -> &[String] {
        if self.is_map() {
            &self.in_names
        } else {
            &self.dim_names
        }
    }

    /// Number of dimensions affine functions over this space range over.
    pub fn domain_dim(&self) -> usize {
        if self.is_map() {
            self.n_in
        } else {
            self.n_dim
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.param_names.is_empty() {
            write!(f, "[{}] -> ", self.param_names.join(", "))?;
        }
        if self.is_map() {
            write!(
                f,
                "{{ [{}] -> [{}] }}",
                self.in_names.join(", "),
                self.dim_names.join(", ")
            )
        } else {
            write!(f, "{{ [{}] }}", self.dim_names.join(", "))
        }
    }
}

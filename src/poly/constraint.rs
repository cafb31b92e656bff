//! Affine constraints.
//!
//! A constraint is an affine function compared against zero:
//! `aff >= 0` (inequality) or `aff = 0` (equality).

use crate::poly::aff::Aff;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single affine constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The constrained function (`expr >= 0` or `expr = 0`).
    pub expr: Aff,
    /// Inequality or equality.
    pub kind: ConstraintKind,
}

/// Constraint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `expr >= 0`
    Inequality,
    /// `expr = 0`
    Equality,
}

impl Constraint {
    /// `expr >= 0`
    pub fn ge_zero(expr: Aff) -> Self {
        Self {
            expr,
            kind: ConstraintKind::Inequality,
        }
    }

    /// `expr = 0`
    pub fn eq_zero(expr: Aff) -> Self {
        Self {
            expr,
            kind: ConstraintKind::Equality,
        }
    }

    /// `lhs >= rhs`
    pub fn ge(lhs: Aff, rhs: Aff) -> Self {
        Self::ge_zero(lhs - rhs)
    }

    /// `lhs <= rhs`
    pub fn le(lhs: Aff, rhs: Aff) -> Self {
        Self::ge_zero(rhs - lhs)
    }

    /// `lhs < rhs`, which over the integers is `lhs <= rhs - 1`.
    pub fn lt(lhs: Aff, rhs: Aff) -> Self {
        let mut expr = rhs - lhs;
        expr.constant -= 1;
        Self::ge_zero(expr)
    }

    /// `lhs = rhs`
    pub fn eq(lhs: Aff, rhs: Aff) -> Self {
        Self::eq_zero(lhs - rhs)
    }

    /// True for equality constraints.
    pub fn is_equality(&self) -> bool {
        matches!(self.kind, ConstraintKind::Equality)
    }

    /// Check the constraint against a concrete point.
    pub fn is_satisfied(&self, dim_values: &[i64], param_values: &[i64]) -> bool {
        let value = self.expr.evaluate(dim_values, param_values);
        match self.kind {
            ConstraintKind::Inequality => value >= 0,
            ConstraintKind::Equality => value == 0,
        }
    }

    /// Render with the given dimension and parameter names.
    pub fn to_string_with_names(&self, dim_names: &[String], param_names: &[String]) -> String {
        let expr_str = self.expr.to_string_with_names(dim_names, param_names);
        match self.kind {
            ConstraintKind::Inequality => format!("{} >= 0", expr_str),
            ConstraintKind::Equality => format!("{} = 0", expr_str),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_names(&[], &[]))
    }
}

/// An ordered collection of constraints over one space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSystem {
    /// The constraints, in insertion order.
    pub constraints: Vec<Constraint>,
    /// Number of set/input dimensions.
    pub n_dim: usize,
    /// Number of parameter dimensions.
    pub n_param: usize,
}

impl ConstraintSystem {
    /// An empty system over the given dimensionality.
    pub fn new(n_dim: usize, n_param: usize) -> Self {
        Self {
            constraints: Vec::new(),
            n_dim,
            n_param,
        }
    }

    /// Add a constraint. The constraint must live in this system's space.
    pub fn add(&mut self, constraint: Constraint) {
        debug_assert_eq!(constraint.expr.n_dim(), self.n_dim);
        debug_assert_eq!(constraint.expr.n_param(), self.n_param);
        self.constraints.push(constraint);
    }

    /// Check all constraints against a concrete point.
    pub fn is_satisfied(&self, dim_values: &[i64], param_values: &[i64]) -> bool {
        self.constraints
            .iter()
            .all(|c| c.is_satisfied(dim_values, param_values))
    }

    /// True if the system has no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }
}

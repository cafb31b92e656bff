//! Integer sets.
//!
//! A set is a space together with affine constraints; its points are the
//! integer tuples satisfying every constraint. Iteration domains and
//! parameter contexts are both sets.

use crate::poly::aff::Aff;
use crate::poly::constraint::{Constraint, ConstraintSystem};
use crate::poly::space::Space;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer set defined by affine constraints over a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Set {
    /// The set's space.
    pub space: Space,
    /// The constraints cutting the space down to the set.
    pub constraints: ConstraintSystem,
}

impl Set {
    /// The unconstrained set over a space.
    pub fn universe(space: Space) -> Self {
        let constraints = ConstraintSystem::new(space.dim(), space.n_param());
        Self { space, constraints }
    }

    /// Number of set dimensions.
    pub fn dim(&self) -> usize {
        self.space.dim()
    }

    /// Number of parameter dimensions.
    pub fn n_param(&self) -> usize {
        self.space.n_param()
    }

    /// Add a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.add(constraint);
    }

    /// Check membership of a concrete point.
    pub fn contains(&self, point: &[i64], params: &[i64]) -> bool {
        self.constraints.is_satisfied(point, params)
    }

    /// Intersect with constraints over the parameter space only. Each
    /// parameter constraint is lifted into this set's space with zero
    /// coefficients on the set dimensions.
    pub fn intersect_params(&self, param_set: &Set) -> Set {
        debug_assert!(param_set.space.is_params());
        debug_assert_eq!(self.space.param_names, param_set.space.param_names);
        let mut result = self.clone();
        for c in &param_set.constraints.constraints {
            let lifted = Aff {
                constant: c.expr.constant,
                coeffs: vec![0; self.dim()],
                param_coeffs: c.expr.param_coeffs.clone(),
            };
            result.add_constraint(Constraint {
                expr: lifted,
                kind: c.kind,
            });
        }
        result
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.space.param_names.is_empty() {
            write!(f, "[{}] -> ", self.space.param_names.join(", "))?;
        }
        write!(f, "{{ [{}]", self.space.dim_names.join(", "))?;
        if !self.constraints.is_empty() {
            write!(f, " : ")?;
            for (i, c) in self.constraints.constraints.iter().enumerate() {
                if i > 0 {
                    write!(f, " and ")?;
                }
                write!(
                    f,
                    "{}",
                    c.to_string_with_names(&self.space.dim_names, &self.space.param_names)
                )?;
            }
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_contains() {
        let pspace = Space::params(names(&["N"]));
        let mut set = Set::universe(pspace.instance(names(&["i"])));
        set.add_constraint(Constraint::ge(Aff::var(0, 1, 1), Aff::zero(1, 1)));
        set.add_constraint(Constraint::lt(Aff::var(0, 1, 1), Aff::param(0, 1, 1)));
        assert!(set.contains(&[0], &[10]));
        assert!(set.contains(&[9], &[10]));
        assert!(!set.contains(&[10], &[10]));
    }

    #[test]
    fn test_intersect_params() {
        let pspace = Space::params(names(&["N"]));
        let mut param_set = Set::universe(pspace.clone());
        // N >= 1
        let mut expr = Aff::param(0, 0, 1);
        expr.constant = -1;
        param_set.add_constraint(Constraint::ge_zero(expr));

        let domain = Set::universe(pspace.instance(names(&["i"])));
        let constrained = domain.intersect_params(&param_set);
        assert!(constrained.contains(&[0], &[1]));
        assert!(!constrained.contains(&[0], &[0]));
    }

    #[test]
    fn test_display() {
        let pspace = Space::params(names(&["N"]));
        let mut set = Set::universe(pspace.instance(names(&["i"])));
        set.add_constraint(Constraint::ge(Aff::var(0, 1, 1), Aff::zero(1, 1)));
        assert_eq!(set.to_string(), "[N] -> { [i] : i >= 0 }");
    }
}

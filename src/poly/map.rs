//! Affine maps.
//!
//! A map sends points of its input space to points of its output space, with
//! one affine function per output dimension. Access relations are maps from
//! statement instances to tensor coordinates.

use crate::poly::aff::Aff;
use crate::poly::space::Space;
use crate::poly::Id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An affine map between two spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    /// The map's space (inputs, outputs, parameters).
    pub space: Space,
    /// One affine function per output dimension, over the input dimensions
    /// and parameters.
    pub outputs: Vec<Aff>,
    /// Coordinate identifiers of the range tuple (one per output dimension),
    /// e.g. the tensor coordinate names of an access relation.
    pub range_ids: Vec<Id>,
}

impl Map {
    /// Build a map from its output functions.
    pub fn from_outputs(space: Space, outputs: Vec<Aff>, range_ids: Vec<Id>) -> Self {
        debug_assert_eq!(space.dim(), outputs.len());
        debug_assert_eq!(outputs.len(), range_ids.len());
        debug_assert!(outputs
            .iter()
            .all(|o| o.n_dim() == space.domain_dim() && o.n_param() == space.n_param()));
        Self {
            space,
            outputs,
            range_ids,
        }
    }

    /// Number of input dimensions.
    pub fn n_in(&self) -> usize {
        self.space.n_in
    }

    /// Number of output dimensions.
    pub fn n_out(&self) -> usize {
        self.space.n_dim
    }

    /// Apply to a concrete input point.
    pub fn apply(&self, input: &[i64], params: &[i64]) -> Vec<i64> {
        self.outputs
            .iter()
            .map(|aff| aff.evaluate(input, params))
            .collect()
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.space.param_names.is_empty() {
            write!(f, "[{}] -> ", self.space.param_names.join(", "))?;
        }
        write!(f, "{{ [{}] -> [", self.space.in_names.join(", "))?;
        for (i, aff) in self.outputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}",
                aff.to_string_with_names(&self.space.in_names, &self.space.param_names)
            )?;
        }
        write!(f, "] }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply() {
        let pspace = Space::params(names(&["N"]));
        let inst = pspace.instance(names(&["i", "j"]));
        let space = inst.map_to(names(&["a0", "a1"]));
        // [i, j] -> [j, i + 1]
        let mut second = Aff::var(0, 2, 1);
        second.constant = 1;
        let map = Map::from_outputs(
            space,
            vec![Aff::var(1, 2, 1), second],
            vec![Id::new("a0"), Id::new("a1")],
        );
        assert_eq!(map.apply(&[3, 7], &[10]), vec![7, 4]);
    }

    #[test]
    fn test_display() {
        let pspace = Space::params(vec![]);
        let inst = pspace.instance(names(&["i"]));
        let space = inst.map_to(names(&["a0"]));
        let map = Map::from_outputs(space, vec![Aff::var(0, 1, 0)], vec![Id::new("a0")]);
        assert_eq!(map.to_string(), "{ [i] -> [i] }");
    }
}

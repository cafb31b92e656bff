//! Access relation construction.
//!
//! Every tensor read or write in a statement becomes a map from the
//! statement's instance space to the tensor's coordinate space. When one
//! statement touches the same tensor through several distinct index maps,
//! each access gets its own suffixed relation identifier so that dependence
//! analysis never conflates them. Suffix assignment follows visitation order
//! and is therefore deterministic: rerunning the builder on identical input
//! assigns identical identifiers.

use crate::errors::{ScopError, ScopResult};
use crate::ir::Expr;
use crate::poly::{Aff, Ctx, Id, Map, Space};
use crate::scop::translate::expr_to_aff_checked;
use serde::{Deserialize, Serialize};

/// Kind of memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessKind {
    /// The statement reads the location.
    Read,
    /// The statement writes the location.
    Write,
}

/// An access relation: statement instances to tensor coordinates.
///
/// `maps` holds one map per affine candidate tuple; an index containing
/// `min`/`max` case-splits into several candidates, all under the same
/// relation identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRelation {
    /// The accessed tensor.
    pub tensor: Id,
    /// Relation identifier: the tensor id, suffixed when the statement holds
    /// earlier distinct accesses to the same tensor.
    pub id: Id,
    /// Read or write.
    pub kind: AccessKind,
    /// Candidate access maps (singleton unless the index case-splits).
    pub maps: Vec<Map>,
}

/// Per-statement registry of accesses already assigned a relation id.
#[derive(Debug, Default)]
pub struct Accesses {
    entries: Vec<RecordedAccess>,
}

#[derive(Debug)]
struct RecordedAccess {
    tensor: Id,
    id: Id,
    maps: Vec<Map>,
}

impl Accesses {
    /// Empty registry for a fresh statement.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the tuple of `dim` fresh coordinate identifiers for a tensor
/// access, scoped to the parameter space. Used as the range tuple of the
/// access relation under construction.
pub fn collect_tensor_coordinate(pspace: &Space, id: &Id, dim: usize) -> Vec<Id> {
    debug_assert!(pspace.is_params());
    (0..dim).map(|k| Id::new(format!("{}_arg{}", id, k))).collect()
}

/// Translate a tensor access's index expressions into candidate access maps
/// over the statement's instance space.
///
/// Indices are translated in checked mode with `min`/`max` allowed: a
/// piecewise index yields one map per candidate tuple (cartesian product
/// across index dimensions). Any other non-affine index is fatal — an
/// approximated array index would corrupt dependence analysis.
pub fn build_access_maps(instance: &Space, tensor: &Id, indices: &[Expr]) -> ScopResult<Vec<Map>> {
    let pspace = Space::params(instance.param_names.clone());
    let coords = collect_tensor_coordinate(&pspace, tensor, indices.len());
    let map_space = instance.map_to(coords.iter().map(|c| c.0.clone()).collect());

    let per_dim: Vec<Vec<Aff>> = indices
        .iter()
        .map(|idx| expr_to_aff_checked(instance, idx, true, true))
        .collect::<ScopResult<_>>()?;

    // Cartesian product of per-dimension candidates.
    let mut tuples: Vec<Vec<Aff>> = vec![Vec::new()];
    for cands in &per_dim {
        let mut next = Vec::with_capacity(tuples.len() * cands.len());
        for tuple in &tuples {
            for cand in cands {
                let mut extended = tuple.clone();
                extended.push(cand.clone());
                next.push(extended);
            }
        }
        tuples = next;
    }

    Ok(tuples
        .into_iter()
        .map(|outputs| Map::from_outputs(map_space.clone(), outputs, coords.clone()))
        .collect())
}

/// Record a newly built access and assign its relation identifier.
///
/// A tensor accessed before in the same statement through the *same* maps
/// reuses the existing identifier; a genuinely distinct access gets the next
/// numeric suffix. Exhausting the context's suffix limit is a fatal
/// disambiguation conflict.
pub fn add_suffix_for_accesses(
    accesses: &mut Accesses,
    maps: Vec<Map>,
    tensor: &Id,
    kind: AccessKind,
    ctx: &Ctx,
) -> ScopResult<AccessRelation> {
    if let Some(existing) = accesses
        .entries
        .iter()
        .find(|e| e.tensor == *tensor && e.maps == maps)
    {
        return Ok(AccessRelation {
            tensor: tensor.clone(),
            id: existing.id.clone(),
            kind,
            maps,
        });
    }

    let count = accesses
        .entries
        .iter()
        .filter(|e| e.tensor == *tensor)
        .count();
    if count > ctx.max_access_suffix {
        return Err(ScopError::DuplicateAccessConflict {
            tensor: tensor.to_string(),
            count,
            limit: ctx.max_access_suffix,
        });
    }

    let id = if count == 0 {
        tensor.clone()
    } else {
        tensor.with_suffix(count)
    };
    accesses.entries.push(RecordedAccess {
        tensor: tensor.clone(),
        id: id.clone(),
        maps: maps.clone(),
    });
    Ok(AccessRelation {
        tensor: tensor.clone(),
        id,
        kind,
        maps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance_1d() -> Space {
        let pspace = Space::params(vec!["N".to_string()]);
        pspace.instance(vec!["i".to_string()])
    }

    #[test]
    fn test_collect_tensor_coordinate() {
        let pspace = Space::params(vec!["N".to_string()]);
        let coords = collect_tensor_coordinate(&pspace, &Id::new("A"), 2);
        assert_eq!(coords, vec![Id::new("A_arg0"), Id::new("A_arg1")]);
    }

    #[test]
    fn test_plain_access_single_map() {
        let instance = instance_1d();
        let maps = build_access_maps(&instance, &Id::new("A"), &[Expr::var("i")]).unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].apply(&[3], &[10]), vec![3]);
    }

    #[test]
    fn test_min_index_case_splits() {
        let instance = instance_1d();
        // A[min(i, N - 1)]
        let idx = Expr::min(Expr::var("i"), Expr::sub(Expr::var("N"), Expr::int(1)));
        let maps = build_access_maps(&instance, &Id::new("A"), &[idx]).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].apply(&[3], &[10]), vec![3]);
        assert_eq!(maps[1].apply(&[3], &[10]), vec![9]);
    }

    #[test]
    fn test_nonaffine_index_is_fatal() {
        let instance = instance_1d();
        let idx = Expr::mul(Expr::var("i"), Expr::var("i"));
        assert!(matches!(
            build_access_maps(&instance, &Id::new("A"), &[idx]),
            Err(ScopError::NonAffine { .. })
        ));
    }

    #[test]
    fn test_suffix_assignment() {
        let ctx = Ctx::new();
        let instance = instance_1d();
        let tensor = Id::new("A");
        let mut accesses = Accesses::new();

        let first = build_access_maps(&instance, &tensor, &[Expr::var("i")]).unwrap();
        let second =
            build_access_maps(&instance, &tensor, &[Expr::add(Expr::var("i"), Expr::int(1))])
                .unwrap();

        let r1 =
            add_suffix_for_accesses(&mut accesses, first.clone(), &tensor, AccessKind::Read, &ctx)
                .unwrap();
        let r2 = add_suffix_for_accesses(&mut accesses, second, &tensor, AccessKind::Read, &ctx)
            .unwrap();
        assert_eq!(r1.id, Id::new("A"));
        assert_eq!(r2.id, Id::new("A_1"));

        // The same map again reuses the first identifier.
        let r3 = add_suffix_for_accesses(&mut accesses, first, &tensor, AccessKind::Write, &ctx)
            .unwrap();
        assert_eq!(r3.id, Id::new("A"));
    }

    #[test]
    fn test_suffix_exhaustion() {
        let ctx = Ctx {
            max_access_suffix: 1,
        };
        let instance = instance_1d();
        let tensor = Id::new("A");
        let mut accesses = Accesses::new();
        for k in 0..2 {
            let maps =
                build_access_maps(&instance, &tensor, &[Expr::add(Expr::var("i"), Expr::int(k))])
                    .unwrap();
            add_suffix_for_accesses(&mut accesses, maps, &tensor, AccessKind::Read, &ctx).unwrap();
        }
        let maps =
            build_access_maps(&instance, &tensor, &[Expr::add(Expr::var("i"), Expr::int(9))])
                .unwrap();
        let err = add_suffix_for_accesses(&mut accesses, maps, &tensor, AccessKind::Read, &ctx);
        assert!(matches!(
            err,
            Err(ScopError::DuplicateAccessConflict { .. })
        ));
    }
}

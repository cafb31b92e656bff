//! Affine translation of IR expressions.
//!
//! Three modes with different failure behavior:
//! - exact (`expr_to_aff`): one affine function or `NonAffine`. Used for
//!   anything where an approximation would corrupt dependence analysis.
//! - checked (`expr_to_aff_checked`): permits `min`/`max` by case-splitting
//!   into one candidate per branch; still fails on anything non-affine
//!   outside an allowed `min`/`max`. Used for access indices.
//! - bounds (`expr_to_aff_bounds`): never fails; unconvertible subterms are
//!   dropped, possibly leaving an empty candidate list. A partial constraint
//!   set only loosens an iteration domain, which is sound for scheduling,
//!   so bound extraction tolerates what index extraction must reject.
//!
//! The tolerant and strict modes are separate functions with distinct return
//! kinds rather than a flag, so call sites show which soundness contract
//! they rely on.

use crate::errors::{ScopError, ScopResult};
use crate::ir::{BinOp, Expr, ExprKind};
use crate::poly::{Aff, Space};
use log::debug;
use num_integer::Integer;

/// Build the constant affine function `v` over `space`. Total.
pub fn int_to_aff(space: &Space, v: i64) -> Aff {
    Aff::constant(v, space.domain_dim(), space.n_param())
}

/// Convert an exactly affine expression into a single affine function over
/// `space`. Fails with [`ScopError::NonAffine`] on any non-linear or
/// unanalyzable subterm, including `min`/`max`.
pub fn expr_to_aff(space: &Space, e: &Expr) -> ScopResult<Aff> {
    let mut affs = translate(space, e, false, false)?;
    // Without min/max splitting every rule yields exactly one candidate.
    debug_assert_eq!(affs.len(), 1);
    Ok(affs.remove(0))
}

/// Like [`expr_to_aff`] but permits `min`/`max` nodes when the corresponding
/// flag is set, returning one candidate affine function per branch. Fails
/// only when a genuinely non-affine construct appears outside an allowed
/// `min`/`max`.
pub fn expr_to_aff_checked(
    space: &Space,
    e: &Expr,
    allow_min: bool,
    allow_max: bool,
) -> ScopResult<Vec<Aff>> {
    translate(space, e, allow_min, allow_max)
}

/// Best-effort translation for iteration-domain bounds. Never fails:
/// unconvertible subterms are dropped and logged, and the returned candidate
/// list may be empty. Each surviving candidate is a valid bound; dropping one
/// merely over-approximates the domain.
pub fn expr_to_aff_bounds(space: &Space, e: &Expr, allow_min: bool, allow_max: bool) -> Vec<Aff> {
    translate_tolerant(space, e, allow_min, allow_max)
}

/// Cross-combine two candidate lists.
fn combine(l: &[Aff], r: &[Aff], f: impl Fn(Aff, Aff) -> Aff) -> Vec<Aff> {
    let mut out = Vec::with_capacity(l.len() * r.len());
    for a in l {
        for b in r {
            out.push(f(a.clone(), b.clone()));
        }
    }
    out
}

/// The constant value of a single-candidate constant list, if any.
fn single_constant(affs: &[Aff]) -> Option<i64> {
    match affs {
        [aff] => aff.as_constant(),
        _ => None,
    }
}

/// Strict translation: `Err` on the first non-affine construct. Every `Ok`
/// list is non-empty.
fn translate(space: &Space, e: &Expr, allow_min: bool, allow_max: bool) -> ScopResult<Vec<Aff>> {
    let non_affine = || ScopError::NonAffine {
        expr: e.to_string(),
    };
    let n_dim = space.domain_dim();
    let n_param = space.n_param();

    match &e.kind {
        ExprKind::IntLit(v) => Ok(vec![Aff::constant(*v, n_dim, n_param)]),
        ExprKind::FloatLit(_) => Err(non_affine()),
        ExprKind::Var(name) => {
            if let Some(idx) = space.dim_index(name) {
                Ok(vec![Aff::var(idx, n_dim, n_param)])
            } else if let Some(idx) = space.param_index(name) {
                Ok(vec![Aff::param(idx, n_dim, n_param)])
            } else {
                Err(non_affine())
            }
        }
        ExprKind::Binary { op, left, right } => {
            let l = translate(space, left, allow_min, allow_max)?;
            let r = translate(space, right, allow_min, allow_max)?;
            match op {
                BinOp::Add => Ok(combine(&l, &r, |a, b| a + b)),
                BinOp::Sub => Ok(combine(&l, &r, |a, b| a - b)),
                BinOp::Mul => {
                    if let Some(c) = single_constant(&l) {
                        Ok(r.iter().map(|aff| aff.scale(c)).collect())
                    } else if let Some(c) = single_constant(&r) {
                        Ok(l.iter().map(|aff| aff.scale(c)).collect())
                    } else {
                        Err(non_affine())
                    }
                }
                BinOp::Div => divide(&l, &r).ok_or_else(non_affine),
                BinOp::Mod => {
                    match (single_constant(&l), single_constant(&r)) {
                        (Some(a), Some(b)) if b != 0 => {
                            Ok(vec![Aff::constant(a.mod_floor(&b), n_dim, n_param)])
                        }
                        _ => Err(non_affine()),
                    }
                }
            }
        }
        ExprKind::Neg(operand) => {
            let inner = translate(space, operand, allow_min, allow_max)?;
            Ok(inner.into_iter().map(|aff| -aff).collect())
        }
        ExprKind::Min(a, b) => {
            if allow_min {
                let mut out = translate(space, a, allow_min, allow_max)?;
                out.extend(translate(space, b, allow_min, allow_max)?);
                Ok(out)
            } else {
                Err(non_affine())
            }
        }
        ExprKind::Max(a, b) => {
            if allow_max {
                let mut out = translate(space, a, allow_min, allow_max)?;
                out.extend(translate(space, b, allow_min, allow_max)?);
                Ok(out)
            } else {
                Err(non_affine())
            }
        }
        ExprKind::FloorDiv { dividend, divisor } => {
            let l = translate(space, dividend, allow_min, allow_max)?;
            let r = translate(space, divisor, allow_min, allow_max)?;
            divide(&l, &r).ok_or_else(non_affine)
        }
        ExprKind::TensorRead { .. } | ExprKind::Call { .. } => Err(non_affine()),
    }
}

/// Division is affine only by a non-zero constant that exactly divides every
/// candidate's coefficients.
fn divide(l: &[Aff], r: &[Aff]) -> Option<Vec<Aff>> {
    let c = single_constant(r)?;
    if c == 0 {
        return None;
    }
    l.iter().map(|aff| aff.exact_div(c)).collect()
}

/// Tolerant translation: failures become dropped candidates, never errors.
fn translate_tolerant(space: &Space, e: &Expr, allow_min: bool, allow_max: bool) -> Vec<Aff> {
    match &e.kind {
        // min/max branches drop independently: each surviving branch is
        // still a valid bound on its own.
        ExprKind::Min(a, b) if allow_min => {
            let mut out = translate_tolerant(space, a, allow_min, allow_max);
            out.extend(translate_tolerant(space, b, allow_min, allow_max));
            out
        }
        ExprKind::Max(a, b) if allow_max => {
            let mut out = translate_tolerant(space, a, allow_min, allow_max);
            out.extend(translate_tolerant(space, b, allow_min, allow_max));
            out
        }
        _ => match translate(space, e, allow_min, allow_max) {
            Ok(affs) => affs,
            Err(_) => {
                debug!("dropping unconvertible bound subexpression: {}", e);
                Vec::new()
            }
        },
    }
}

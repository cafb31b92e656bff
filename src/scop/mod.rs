//! Static-control-part extraction.
//!
//! Turns a restricted statement tree into a polyhedral model: an initial
//! schedule tree plus, per statement, an iteration domain, read and write
//! access relations, and an operation classification. The submodules split
//! the work along its natural seams: affine translation, access relation
//! construction, statement classification, and the tree-building walk that
//! ties them together.

pub mod access;
pub mod builder;
pub mod classify;
pub mod translate;

pub use access::{
    add_suffix_for_accesses, build_access_maps, collect_tensor_coordinate, AccessKind,
    AccessRelation, Accesses,
};
pub use builder::{create_params_space, create_params_space_with, make_schedule_tree};
pub use classify::{parse_stmt_op_call, parse_stmt_ops, AnalysisResult, StmtOp};
pub use translate::{expr_to_aff, expr_to_aff_bounds, expr_to_aff_checked, int_to_aff};

use crate::errors::ScopResult;
use crate::ir::{Stmt, Var};
use crate::poly::{Aff, Constraint, Ctx, Id, ScheduleTree, Set};
use serde::{Deserialize, Serialize};

/// Everything extracted for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtInfo {
    /// The statement's identifier (`S0`, `S1`, ... in lexical order).
    pub id: Id,
    /// Iteration domain over the enclosing loop dimensions.
    pub domain: Set,
    /// Read access relations, in right-hand-side visitation order.
    pub reads: Vec<AccessRelation>,
    /// Write access relations.
    pub writes: Vec<AccessRelation>,
}

/// Accumulated model of a compilation unit.
///
/// Owns the algebra context; statement and analysis entries are appended by
/// [`make_schedule_tree`] only when a whole build succeeds, so a failed call
/// leaves previously committed entries intact and adds nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopInfo {
    /// Context shared by every object in this unit.
    pub ctx: Ctx,
    /// Per-statement extraction results, in lexical order.
    pub statements: Vec<StmtInfo>,
    /// Per-statement classification results.
    pub analysis: AnalysisResult,
}

impl ScopInfo {
    /// Empty model bound to a context.
    pub fn new(ctx: Ctx) -> Self {
        Self {
            ctx,
            statements: Vec::new(),
            analysis: AnalysisResult::new(),
        }
    }

    /// Look up a statement by identifier.
    pub fn stmt(&self, id: &Id) -> Option<&StmtInfo> {
        self.statements.iter().find(|s| &s.id == id)
    }
}

/// A complete extracted static control part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scop {
    /// The initial schedule tree, encoding original execution order.
    pub schedule: ScheduleTree,
    /// Domains, accesses and classification backing the tree.
    pub info: ScopInfo,
}

/// Extract the polyhedral model of a statement tree.
///
/// `params` names the symbolic sizes, in the order their dimensions appear
/// in every space built for this unit. Parameters are assumed positive; loop
/// extents and tensor sizes of zero make the unit empty and are excluded up
/// front.
pub fn build_scop(ctx: Ctx, params: &[Var], stmt: &Stmt) -> ScopResult<Scop> {
    let param_space = create_params_space_with(&ctx, params);
    let mut param_set = Set::universe(param_space.clone());
    for i in 0..param_space.n_param() {
        // p >= 1
        let mut expr = Aff::param(i, 0, param_space.n_param());
        expr.constant = -1;
        param_set.add_constraint(Constraint::ge_zero(expr));
    }

    let mut info = ScopInfo::new(ctx);
    let schedule = make_schedule_tree(&param_space, &param_set, stmt, &mut info)?;
    Ok(Scop { schedule, info })
}

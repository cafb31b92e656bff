//! Input tensor IR.
//!
//! This is the interface boundary with the producing compiler: a sequential,
//! loop-nest-based representation of a tensor computation. The node kinds are
//! a closed set of tagged variants so that the scop builder's dispatch is
//! exhaustive and compiler-checked.

pub mod expr;
pub mod stmt;

pub use expr::{BinOp, CmpOp, Cond, CondKind, Expr, ExprKind, Var};
pub use stmt::{Stmt, StmtKind};

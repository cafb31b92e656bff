//! Statements of the tensor IR.

use crate::ir::expr::{Cond, Expr, Var};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A statement node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// The statement variant.
    pub kind: StmtKind,
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// Store one value into a tensor element: `tensor[indices] = value`.
    Provide {
        /// Target tensor name.
        tensor: String,
        /// One index expression per tensor dimension.
        indices: Vec<Expr>,
        /// Right-hand-side value.
        value: Expr,
    },
    /// Counted loop over `var` from `lower` (inclusive) to `upper`
    /// (exclusive) with unit step.
    For {
        /// Induction variable.
        var: Var,
        /// Lower bound (inclusive).
        lower: Expr,
        /// Upper bound (exclusive).
        upper: Expr,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// Lexical sequence of statements.
    Seq(Vec<Stmt>),
    /// Guarded statement. The guard must be an affine condition on loop
    /// variables and parameters.
    If {
        /// Guard condition.
        cond: Cond,
        /// Statement executed when the guard holds.
        then_stmt: Box<Stmt>,
        /// Statement executed otherwise.
        otherwise: Option<Box<Stmt>>,
    },
}

impl Stmt {
    /// Tensor store statement.
    pub fn provide(tensor: impl Into<String>, indices: Vec<Expr>, value: Expr) -> Self {
        Self {
            kind: StmtKind::Provide {
                tensor: tensor.into(),
                indices,
                value,
            },
        }
    }

    /// Counted loop with unit step.
    pub fn for_loop(var: Var, lower: Expr, upper: Expr, body: Stmt) -> Self {
        Self {
            kind: StmtKind::For {
                var,
                lower,
                upper,
                body: Box::new(body),
            },
        }
    }

    /// Lexical sequence.
    pub fn seq(stmts: Vec<Stmt>) -> Self {
        Self {
            kind: StmtKind::Seq(stmts),
        }
    }

    /// Guarded statement without an else branch.
    pub fn if_then(cond: Cond, then_stmt: Stmt) -> Self {
        Self {
            kind: StmtKind::If {
                cond,
                then_stmt: Box::new(then_stmt),
                otherwise: None,
            },
        }
    }

    /// Guarded statement with an else branch.
    pub fn if_then_else(cond: Cond, then_stmt: Stmt, otherwise: Stmt) -> Self {
        Self {
            kind: StmtKind::If {
                cond,
                then_stmt: Box::new(then_stmt),
                otherwise: Some(Box::new(otherwise)),
            },
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Provide {
                tensor,
                indices,
                value,
            } => {
                write!(f, "{}[", tensor)?;
                for (i, idx) in indices.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", idx)?;
                }
                write!(f, "] = {}", value)
            }
            StmtKind::For {
                var, lower, upper, ..
            } => write!(f, "for {} = {} to {} {{ .. }}", var, lower, upper),
            StmtKind::Seq(stmts) => write!(f, "seq({} statements)", stmts.len()),
            StmtKind::If { cond, .. } => write!(f, "if {} {{ .. }}", cond),
        }
    }
}

//! Polyhedral model extraction for restricted tensor programs.
//!
//! `polyscop` turns a statement tree of loops, guards and tensor stores into
//! a static control part: an initial schedule tree plus per-statement
//! iteration domains, access relations and operation classifications, all
//! expressed over a shared parameter space of symbolic sizes.
//!
//! # Example
//!
//! ```
//! use polyscop::ir::{Expr, Stmt, Var};
//! use polyscop::poly::Ctx;
//! use polyscop::build_scop;
//!
//! // for i = 0 to N { C[i] = A[i] + B[i] }
//! let body = Stmt::provide(
//!     "C",
//!     vec![Expr::var("i")],
//!     Expr::add(
//!         Expr::read("A", vec![Expr::var("i")]),
//!         Expr::read("B", vec![Expr::var("i")]),
//!     ),
//! );
//! let prog = Stmt::for_loop(Var::new("i"), Expr::int(0), Expr::var("N"), body);
//!
//! let scop = build_scop(Ctx::new(), &[Var::new("N")], &prog).unwrap();
//! assert_eq!(scop.schedule.n_leaves(), 1);
//! ```

#![warn(missing_docs)]

pub mod errors;
pub mod ir;
pub mod poly;
pub mod scop;

pub use errors::{ScopError, ScopResult};
pub use scop::{build_scop, Scop, ScopInfo, StmtInfo};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::errors::{ScopError, ScopResult};
    pub use crate::ir::{BinOp, CmpOp, Cond, Expr, Stmt, Var};
    pub use crate::poly::{Aff, Constraint, Ctx, Id, Map, ScheduleTree, Set, Space};
    pub use crate::scop::{
        build_scop, AccessKind, AccessRelation, AnalysisResult, Scop, ScopInfo, StmtInfo, StmtOp,
    };
}

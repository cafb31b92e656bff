//! Statement classification.
//!
//! Tags each statement with a coarse operation category used by downstream
//! tiling and fusion heuristics. Classification is an optimization hint, not
//! a correctness requirement: unrecognized call patterns degrade to an opaque
//! category and are only logged, never propagated as errors.

use crate::ir::{Expr, ExprKind};
use crate::poly::Id;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse operation category of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtOp {
    /// Pointwise computation over the iteration space.
    Elementwise,
    /// Accumulation into the written element, or a recognized reduction
    /// combiner intrinsic.
    Reduction,
    /// Pure data movement: copy, broadcast, transpose, pad.
    DataMovement,
    /// A call that matches no recognized pattern.
    OpaqueCall,
}

impl fmt::Display for StmtOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StmtOp::Elementwise => "elementwise",
            StmtOp::Reduction => "reduction",
            StmtOp::DataMovement => "data_movement",
            StmtOp::OpaqueCall => "opaque_call",
        };
        write!(f, "{}", s)
    }
}

/// Recognized reduction-combiner intrinsics.
pub const REDUCE_CALLS: &[&str] = &["red_sum", "red_prod", "red_max", "red_min", "mad"];

/// Recognized data-movement intrinsics.
pub const DATA_MOVEMENT_CALLS: &[&str] = &["copy", "broadcast", "transpose", "pad"];

/// Per-statement classification and access metadata, accumulated while the
/// statement tree is walked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    stmt_ops: BTreeMap<Id, StmtOp>,
    reduce_accumulators: BTreeMap<Id, Id>,
}

impl AnalysisResult {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a statement's classification. Every statement receives exactly
    /// one; the builder calls the classifier once per statement.
    pub fn record_stmt_op(&mut self, id: &Id, op: StmtOp) {
        self.stmt_ops.insert(id.clone(), op);
    }

    /// Record which tensor a reduction statement accumulates into.
    pub fn record_reduce_accumulator(&mut self, id: &Id, tensor: &Id) {
        self.reduce_accumulators.insert(id.clone(), tensor.clone());
    }

    /// Classification of a statement, if recorded.
    pub fn stmt_op(&self, id: &Id) -> Option<StmtOp> {
        self.stmt_ops.get(id).copied()
    }

    /// Accumulator tensor of a reduction statement, if any.
    pub fn reduce_accumulator(&self, id: &Id) -> Option<&Id> {
        self.reduce_accumulators.get(id)
    }

    /// Merge another accumulator into this one.
    pub fn merge(&mut self, other: AnalysisResult) {
        self.stmt_ops.extend(other.stmt_ops);
        self.reduce_accumulators.extend(other.reduce_accumulators);
    }
}

/// Classify a call expression on a statement's right-hand side against the
/// recognized intrinsic sets and record the result for statement `id`.
/// `target` is the tensor the statement writes.
pub fn parse_stmt_op_call(id: &Id, func: &str, result: &mut AnalysisResult, target: &Id) {
    if REDUCE_CALLS.contains(&func) {
        result.record_stmt_op(id, StmtOp::Reduction);
        result.record_reduce_accumulator(id, target);
    } else if DATA_MOVEMENT_CALLS.contains(&func) {
        result.record_stmt_op(id, StmtOp::DataMovement);
    } else {
        debug!(
            "unrecognized operation `{}` in {}; classifying as opaque call",
            func, id
        );
        result.record_stmt_op(id, StmtOp::OpaqueCall);
    }
}

/// Classify a statement from its right-hand-side value and record the result.
///
/// Walks the whole value expression: the first recognized intrinsic call (in
/// left-to-right order) determines the category even when it sits under
/// arithmetic, so `red_sum(A[i]) * 2` is still a reduction. With no
/// recognized call the category is inferred from the expression shape: a
/// statement reading the tensor it writes is an accumulation, a remaining
/// call is opaque, a bare tensor read is data movement, anything else is
/// elementwise. Every statement gets exactly one classification.
pub fn parse_stmt_ops(id: &Id, val: &Expr, result: &mut AnalysisResult, target: &Id) {
    if let Some(func) = find_call(val, &is_recognized_call) {
        parse_stmt_op_call(id, func, result, target);
    } else if reads_tensor(val, target) {
        result.record_stmt_op(id, StmtOp::Reduction);
        result.record_reduce_accumulator(id, target);
    } else if let Some(func) = find_call(val, &|_| true) {
        parse_stmt_op_call(id, func, result, target);
    } else if matches!(val.kind, ExprKind::TensorRead { .. }) {
        result.record_stmt_op(id, StmtOp::DataMovement);
    } else {
        result.record_stmt_op(id, StmtOp::Elementwise);
    }
}

fn is_recognized_call(func: &str) -> bool {
    REDUCE_CALLS.contains(&func) || DATA_MOVEMENT_CALLS.contains(&func)
}

/// First call node (pre-order, left to right) whose name satisfies the
/// predicate.
fn find_call<'a>(e: &'a Expr, pred: &dyn Fn(&str) -> bool) -> Option<&'a str> {
    match &e.kind {
        ExprKind::Call { func, args } => {
            if pred(func) {
                return Some(func);
            }
            args.iter().find_map(|a| find_call(a, pred))
        }
        ExprKind::Binary { left, right, .. } => {
            find_call(left, pred).or_else(|| find_call(right, pred))
        }
        ExprKind::Neg(operand) => find_call(operand, pred),
        ExprKind::Min(a, b) | ExprKind::Max(a, b) => {
            find_call(a, pred).or_else(|| find_call(b, pred))
        }
        ExprKind::FloorDiv { dividend, divisor } => {
            find_call(dividend, pred).or_else(|| find_call(divisor, pred))
        }
        ExprKind::TensorRead { indices, .. } => indices.iter().find_map(|i| find_call(i, pred)),
        ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::Var(_) => None,
    }
}

/// True if the expression reads any element of the given tensor.
fn reads_tensor(e: &Expr, tensor: &Id) -> bool {
    match &e.kind {
        ExprKind::TensorRead {
            tensor: name,
            indices,
        } => name == tensor.as_str() || indices.iter().any(|idx| reads_tensor(idx, tensor)),
        ExprKind::Binary { left, right, .. } => {
            reads_tensor(left, tensor) || reads_tensor(right, tensor)
        }
        ExprKind::Neg(operand) => reads_tensor(operand, tensor),
        ExprKind::Min(a, b) | ExprKind::Max(a, b) => {
            reads_tensor(a, tensor) || reads_tensor(b, tensor)
        }
        ExprKind::FloorDiv { dividend, divisor } => {
            reads_tensor(dividend, tensor) || reads_tensor(divisor, tensor)
        }
        ExprKind::Call { args, .. } => args.iter().any(|a| reads_tensor(a, tensor)),
        ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::Var(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt_id() -> Id {
        Id::new("S0")
    }

    #[test]
    fn test_elementwise() {
        let mut result = AnalysisResult::new();
        // C[i] = A[i] + B[i]
        let val = Expr::add(
            Expr::read("A", vec![Expr::var("i")]),
            Expr::read("B", vec![Expr::var("i")]),
        );
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::Elementwise));
        assert!(result.reduce_accumulator(&stmt_id()).is_none());
    }

    #[test]
    fn test_accumulation_is_reduction() {
        let mut result = AnalysisResult::new();
        // C[i] = C[i] + A[i]
        let val = Expr::add(
            Expr::read("C", vec![Expr::var("i")]),
            Expr::read("A", vec![Expr::var("i")]),
        );
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::Reduction));
        assert_eq!(result.reduce_accumulator(&stmt_id()), Some(&Id::new("C")));
    }

    #[test]
    fn test_reduce_call() {
        let mut result = AnalysisResult::new();
        let val = Expr::call(
            "red_sum",
            vec![Expr::read("A", vec![Expr::var("i"), Expr::var("k")])],
        );
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::Reduction));
        assert_eq!(result.reduce_accumulator(&stmt_id()), Some(&Id::new("C")));
    }

    #[test]
    fn test_data_movement_call_and_bare_read() {
        let mut result = AnalysisResult::new();
        let val = Expr::call("transpose", vec![Expr::read("A", vec![Expr::var("i")])]);
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("B"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::DataMovement));

        let copy = Expr::read("A", vec![Expr::var("i")]);
        let id2 = Id::new("S1");
        parse_stmt_ops(&id2, &copy, &mut result, &Id::new("B"));
        assert_eq!(result.stmt_op(&id2), Some(StmtOp::DataMovement));
    }

    #[test]
    fn test_unrecognized_call_is_opaque() {
        let mut result = AnalysisResult::new();
        let val = Expr::call("mystery_op", vec![Expr::var("i")]);
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::OpaqueCall));
    }

    #[test]
    fn test_nested_reduce_call_is_reduction() {
        let mut result = AnalysisResult::new();
        // C[i] = red_sum(A[i]) * 2: the intrinsic sits under arithmetic.
        let val = Expr::mul(
            Expr::call("red_sum", vec![Expr::read("A", vec![Expr::var("i")])]),
            Expr::int(2),
        );
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::Reduction));
        assert_eq!(result.reduce_accumulator(&stmt_id()), Some(&Id::new("C")));
    }

    #[test]
    fn test_nested_data_movement_call() {
        let mut result = AnalysisResult::new();
        // B[i] = -transpose(A[i])
        let val = Expr::neg(Expr::call(
            "transpose",
            vec![Expr::read("A", vec![Expr::var("i")])],
        ));
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("B"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::DataMovement));
    }

    #[test]
    fn test_nested_unrecognized_call_is_opaque() {
        let mut result = AnalysisResult::new();
        // C[i] = mystery(A[i]) + 1: no recognized call, no target read.
        let val = Expr::add(
            Expr::call("mystery", vec![Expr::read("A", vec![Expr::var("i")])]),
            Expr::int(1),
        );
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::OpaqueCall));
    }

    #[test]
    fn test_recognized_call_wins_over_accumulation() {
        let mut result = AnalysisResult::new();
        // C[i] = red_max(C[i], A[i]): intrinsic and target read agree.
        let val = Expr::call(
            "red_max",
            vec![
                Expr::read("C", vec![Expr::var("i")]),
                Expr::read("A", vec![Expr::var("i")]),
            ],
        );
        parse_stmt_ops(&stmt_id(), &val, &mut result, &Id::new("C"));
        assert_eq!(result.stmt_op(&stmt_id()), Some(StmtOp::Reduction));
        assert_eq!(result.reduce_accumulator(&stmt_id()), Some(&Id::new("C")));
    }
}

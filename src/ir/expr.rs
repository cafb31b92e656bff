//! Scalar expressions of the tensor IR.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A symbolic scalar variable: a loop induction variable or a runtime-known
/// parameter such as a tensor extent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var {
    /// Variable name, unique within a compilation unit.
    pub name: String,
}

impl Var {
    /// Create a variable with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A scalar expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// The expression variant.
    pub kind: ExprKind,
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Integer literal.
    IntLit(i64),
    /// Floating-point literal. Never affine.
    FloatLit(f64),
    /// Reference to a loop variable or parameter.
    Var(String),
    /// Binary arithmetic.
    Binary {
        /// Operator.
        op: BinOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// Minimum of two expressions.
    Min(Box<Expr>, Box<Expr>),
    /// Maximum of two expressions.
    Max(Box<Expr>, Box<Expr>),
    /// Floor division (rounds toward negative infinity).
    FloorDiv {
        /// Dividend.
        dividend: Box<Expr>,
        /// Divisor.
        divisor: Box<Expr>,
    },
    /// Read of one tensor element.
    TensorRead {
        /// Tensor name.
        tensor: String,
        /// One index expression per tensor dimension.
        indices: Vec<Expr>,
    },
    /// Call to a named intrinsic or external function.
    Call {
        /// Callee name.
        func: String,
        /// Arguments.
        args: Vec<Expr>,
    },
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division (truncating on constants only; affine when exact).
    Div,
    /// Modulo.
    Mod,
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Self { kind }
    }

    /// Integer literal.
    pub fn int(v: i64) -> Self {
        Self::new(ExprKind::IntLit(v))
    }

    /// Floating-point literal.
    pub fn float(v: f64) -> Self {
        Self::new(ExprKind::FloatLit(v))
    }

    /// Variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Var(name.into()))
    }

    /// Binary operation.
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `left + right`
    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Add, left, right)
    }

    /// `left - right`
    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Sub, left, right)
    }

    /// `left * right`
    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Mul, left, right)
    }

    /// Negation.
    pub fn neg(operand: Expr) -> Self {
        Self::new(ExprKind::Neg(Box::new(operand)))
    }

    /// `min(a, b)`
    pub fn min(a: Expr, b: Expr) -> Self {
        Self::new(ExprKind::Min(Box::new(a), Box::new(b)))
    }

    /// `max(a, b)`
    pub fn max(a: Expr, b: Expr) -> Self {
        Self::new(ExprKind::Max(Box::new(a), Box::new(b)))
    }

    /// Floor division.
    pub fn floor_div(dividend: Expr, divisor: Expr) -> Self {
        Self::new(ExprKind::FloorDiv {
            dividend: Box::new(dividend),
            divisor: Box::new(divisor),
        })
    }

    /// Tensor element read.
    pub fn read(tensor: impl Into<String>, indices: Vec<Expr>) -> Self {
        Self::new(ExprKind::TensorRead {
            tensor: tensor.into(),
            indices,
        })
    }

    /// Intrinsic or external call.
    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            func: func.into(),
            args,
        })
    }

    /// Evaluate an integer expression under a variable assignment.
    ///
    /// Returns `None` for tensor reads, calls, float literals, unbound
    /// variables and division by zero. Used to cross-check the affine
    /// translator against direct evaluation.
    pub fn evaluate(&self, env: &BTreeMap<String, i64>) -> Option<i64> {
        match &self.kind {
            ExprKind::IntLit(v) => Some(*v),
            ExprKind::FloatLit(_) => None,
            ExprKind::Var(name) => env.get(name).copied(),
            ExprKind::Binary { op, left, right } => {
                let l = left.evaluate(env)?;
                let r = right.evaluate(env)?;
                match op {
                    BinOp::Add => Some(l + r),
                    BinOp::Sub => Some(l - r),
                    BinOp::Mul => Some(l * r),
                    BinOp::Div if r != 0 => Some(num_integer::Integer::div_floor(&l, &r)),
                    BinOp::Mod if r != 0 => Some(num_integer::Integer::mod_floor(&l, &r)),
                    _ => None,
                }
            }
            ExprKind::Neg(operand) => Some(-operand.evaluate(env)?),
            ExprKind::Min(a, b) => Some(a.evaluate(env)?.min(b.evaluate(env)?)),
            ExprKind::Max(a, b) => Some(a.evaluate(env)?.max(b.evaluate(env)?)),
            ExprKind::FloorDiv { dividend, divisor } => {
                let n = dividend.evaluate(env)?;
                let d = divisor.evaluate(env)?;
                if d == 0 {
                    None
                } else {
                    Some(num_integer::Integer::div_floor(&n, &d))
                }
            }
            ExprKind::TensorRead { .. } | ExprKind::Call { .. } => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::IntLit(v) => write!(f, "{}", v),
            ExprKind::FloatLit(v) => write!(f, "{}", v),
            ExprKind::Var(name) => write!(f, "{}", name),
            ExprKind::Binary { op, left, right } => {
                let op_str = match op {
                    BinOp::Add => "+",
                    BinOp::Sub => "-",
                    BinOp::Mul => "*",
                    BinOp::Div => "/",
                    BinOp::Mod => "%",
                };
                write!(f, "({} {} {})", left, op_str, right)
            }
            ExprKind::Neg(operand) => write!(f, "-{}", operand),
            ExprKind::Min(a, b) => write!(f, "min({}, {})", a, b),
            ExprKind::Max(a, b) => write!(f, "max({}, {})", a, b),
            ExprKind::FloorDiv { dividend, divisor } => {
                write!(f, "floord({}, {})", dividend, divisor)
            }
            ExprKind::TensorRead { tensor, indices } => {
                write!(f, "{}[", tensor)?;
                for (i, idx) in indices.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", idx)?;
                }
                write!(f, "]")
            }
            ExprKind::Call { func, args } => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// An affine guard condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cond {
    /// The condition variant.
    pub kind: CondKind,
}

/// Condition kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CondKind {
    /// Comparison of two scalar expressions.
    Cmp {
        /// Comparison operator.
        op: CmpOp,
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// Conjunction of two conditions.
    And(Box<Cond>, Box<Cond>),
}

/// Comparison operators usable in guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Equal.
    Eq,
}

impl Cond {
    /// Comparison condition.
    pub fn cmp(op: CmpOp, left: Expr, right: Expr) -> Self {
        Self {
            kind: CondKind::Cmp { op, left, right },
        }
    }

    /// Conjunction of two conditions.
    pub fn and(a: Cond, b: Cond) -> Self {
        Self {
            kind: CondKind::And(Box::new(a), Box::new(b)),
        }
    }

    /// Negate the condition, if the negation is still a conjunction of
    /// comparisons. `And` negates into a disjunction and `Eq` into a
    /// disequality, neither of which fits a convex guard, so both
    /// return `None`.
    pub fn negate(&self) -> Option<Cond> {
        match &self.kind {
            CondKind::Cmp { op, left, right } => {
                let flipped = match op {
                    CmpOp::Lt => CmpOp::Ge,
                    CmpOp::Le => CmpOp::Gt,
                    CmpOp::Gt => CmpOp::Le,
                    CmpOp::Ge => CmpOp::Lt,
                    CmpOp::Eq => return None,
                };
                Some(Cond::cmp(flipped, left.clone(), right.clone()))
            }
            CondKind::And(_, _) => None,
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CondKind::Cmp { op, left, right } => {
                let op_str = match op {
                    CmpOp::Lt => "<",
                    CmpOp::Le => "<=",
                    CmpOp::Gt => ">",
                    CmpOp::Ge => ">=",
                    CmpOp::Eq => "==",
                };
                write!(f, "({} {} {})", left, op_str, right)
            }
            CondKind::And(a, b) => write!(f, "({} && {})", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_evaluate_affine() {
        // 2*i + N - 1
        let e = Expr::sub(
            Expr::add(Expr::mul(Expr::int(2), Expr::var("i")), Expr::var("N")),
            Expr::int(1),
        );
        assert_eq!(e.evaluate(&env(&[("i", 3), ("N", 10)])), Some(15));
    }

    #[test]
    fn test_evaluate_min_max() {
        let e = Expr::min(Expr::var("i"), Expr::max(Expr::var("j"), Expr::int(0)));
        assert_eq!(e.evaluate(&env(&[("i", 5), ("j", -2)])), Some(0));
    }

    #[test]
    fn test_evaluate_unbound() {
        assert_eq!(Expr::var("x").evaluate(&env(&[])), None);
    }

    #[test]
    fn test_display() {
        let e = Expr::read("A", vec![Expr::min(Expr::var("i"), Expr::int(7))]);
        assert_eq!(e.to_string(), "A[min(i, 7)]");
    }

    #[test]
    fn test_negate_cmp() {
        let c = Cond::cmp(CmpOp::Lt, Expr::var("i"), Expr::var("N"));
        let n = c.negate().unwrap();
        assert_eq!(n, Cond::cmp(CmpOp::Ge, Expr::var("i"), Expr::var("N")));
    }

    #[test]
    fn test_negate_and_fails() {
        let c = Cond::and(
            Cond::cmp(CmpOp::Lt, Expr::var("i"), Expr::var("N")),
            Cond::cmp(CmpOp::Ge, Expr::var("i"), Expr::int(0)),
        );
        assert!(c.negate().is_none());
    }
}

//! Schedule-tree construction.
//!
//! The builder walks the statement tree once, in lexical order. Each
//! statement passes through a fixed sequence of stages — domain, accesses,
//! classification, attachment to the tree — enforced structurally by the
//! single pass. Any fatal error aborts the whole call with no partial tree:
//! an unrepresentable statement invalidates the polyhedral model of the
//! surrounding nest, so static-control-part extraction has no partial-success
//! mode.

use crate::errors::{ScopError, ScopResult};
use crate::ir::{CmpOp, Cond, CondKind, Expr, Stmt, StmtKind, Var};
use crate::poly::{Aff, Constraint, Ctx, Id, ScheduleTree, Set, Space};
use crate::scop::access::{
    add_suffix_for_accesses, build_access_maps, AccessKind, AccessRelation, Accesses,
};
use crate::scop::classify::{parse_stmt_ops, AnalysisResult};
use crate::scop::translate::{expr_to_aff, expr_to_aff_bounds};
use crate::scop::{ScopInfo, StmtInfo};
use log::{debug, trace};

/// Create an empty parameter space bound to the given algebra context.
pub fn create_params_space(_ctx: &Ctx) -> Space {
    Space::params(Vec::new())
}

/// Create a parameter space with one named dimension per symbolic variable,
/// in slice order. The order is part of the contract: affine functions
/// referencing the same parameter names must land in matching spaces.
pub fn create_params_space_with(_ctx: &Ctx, params: &[Var]) -> Space {
    Space::params(params.iter().map(|v| v.name.clone()).collect())
}

/// Build the initial schedule tree for a statement tree.
///
/// Walks `stmt` in lexical order; for each statement derives its iteration
/// domain from the enclosing loop bounds (tolerant bound translation),
/// builds its access relations, classifies it, and appends a leaf under the
/// band structure of the current loop nest. `param_set` supplies externally
/// known constraints on parameter values, intersected into every domain.
///
/// On success the accumulated per-statement analysis is committed into
/// `scop_info`; on error `scop_info` is left untouched.
pub fn make_schedule_tree(
    param_space: &Space,
    param_set: &Set,
    stmt: &Stmt,
    scop_info: &mut ScopInfo,
) -> ScopResult<ScheduleTree> {
    debug_assert!(param_space.is_params());
    debug_assert_eq!(&param_set.space, param_space);

    let mut builder = TreeBuilder {
        param_space,
        param_set,
        ctx: scop_info.ctx.clone(),
        loop_nest: Vec::new(),
        guards: Vec::new(),
        statements: Vec::new(),
        analysis: AnalysisResult::new(),
        next_stmt: scop_info.statements.len(),
    };

    let child = builder
        .walk(stmt)?
        .unwrap_or_else(|| ScheduleTree::Sequence(Vec::new()));
    let domains = builder
        .statements
        .iter()
        .map(|s| (s.id.clone(), s.domain.clone()))
        .collect();

    // All-or-nothing: commit only after the whole tree walked cleanly.
    scop_info.statements.append(&mut builder.statements);
    scop_info.analysis.merge(builder.analysis);

    Ok(ScheduleTree::Domain {
        domains,
        child: Box::new(child),
    })
}

/// One level of the current loop nest.
struct LoopInfo<'a> {
    var: &'a Var,
    lower: &'a Expr,
    upper: &'a Expr,
}

struct TreeBuilder<'a> {
    param_space: &'a Space,
    param_set: &'a Set,
    ctx: Ctx,
    /// Enclosing loops, outermost first.
    loop_nest: Vec<LoopInfo<'a>>,
    /// Enclosing affine guards.
    guards: Vec<Cond>,
    statements: Vec<StmtInfo>,
    analysis: AnalysisResult,
    next_stmt: usize,
}

impl<'a> TreeBuilder<'a> {
    /// Walk a statement subtree, returning its schedule subtree. Subtrees
    /// containing no tensor store contribute nothing.
    fn walk(&mut self, stmt: &'a Stmt) -> ScopResult<Option<ScheduleTree>> {
        match &stmt.kind {
            StmtKind::Seq(stmts) => {
                let mut subtrees = Vec::new();
                for s in stmts {
                    if let Some(t) = self.walk(s)? {
                        subtrees.push(t);
                    }
                }
                Ok(match subtrees.len() {
                    0 => None,
                    1 => Some(subtrees.remove(0)),
                    _ => Some(ScheduleTree::Sequence(
                        subtrees.into_iter().map(wrap_in_filter).collect(),
                    )),
                })
            }

            StmtKind::For {
                var,
                lower,
                upper,
                body,
            } => {
                self.loop_nest.push(LoopInfo { var, lower, upper });
                let inner = self.walk(body);
                self.loop_nest.pop();
                Ok(inner?.map(|t| ScheduleTree::band(vec![var.name.clone()], t)))
            }

            StmtKind::If {
                cond,
                then_stmt,
                otherwise,
            } => {
                self.guards.push(cond.clone());
                let then_tree = self.walk(then_stmt);
                self.guards.pop();
                let then_tree = then_tree?;

                let else_tree = match otherwise {
                    Some(else_stmt) => match cond.negate() {
                        Some(neg) => {
                            self.guards.push(neg);
                            let t = self.walk(else_stmt);
                            self.guards.pop();
                            t?
                        }
                        None => {
                            // No convex negation; the else domain is left
                            // over-approximated.
                            debug!("guard {} has no convex negation; else-branch domain over-approximated", cond);
                            self.walk(else_stmt)?
                        }
                    },
                    None => None,
                };

                Ok(match (then_tree, else_tree) {
                    (Some(t), Some(e)) => Some(ScheduleTree::Sequence(vec![
                        wrap_in_filter(t),
                        wrap_in_filter(e),
                    ])),
                    (Some(t), None) => Some(t),
                    (None, Some(e)) => Some(e),
                    (None, None) => None,
                })
            }

            StmtKind::Provide {
                tensor,
                indices,
                value,
            } => self.visit_provide(tensor, indices, value).map(Some),
        }
    }

    /// Process one tensor store: domain, accesses, classification, leaf.
    fn visit_provide(
        &mut self,
        tensor: &str,
        indices: &[Expr],
        value: &Expr,
    ) -> ScopResult<ScheduleTree> {
        let id = Id::new(format!("S{}", self.next_stmt));
        self.next_stmt += 1;
        trace!("building statement {} writing `{}`", id, tensor);

        let instance = self.instance_space();
        let domain = self.build_domain(&instance)?;

        let mut accesses = Accesses::new();
        let tensor_id = Id::new(tensor);
        let write_maps = build_access_maps(&instance, &tensor_id, indices)?;
        let writes = vec![add_suffix_for_accesses(
            &mut accesses,
            write_maps,
            &tensor_id,
            AccessKind::Write,
            &self.ctx,
        )?];
        let mut reads = Vec::new();
        self.collect_reads(value, &instance, &mut accesses, &mut reads)?;

        parse_stmt_ops(&id, value, &mut self.analysis, &tensor_id);

        self.statements.push(StmtInfo {
            id: id.clone(),
            domain,
            reads,
            writes,
        });
        Ok(ScheduleTree::Leaf(id))
    }

    /// Instance space of the current loop nest.
    fn instance_space(&self) -> Space {
        self.param_space
            .instance(self.loop_nest.iter().map(|l| l.var.name.clone()).collect())
    }

    /// Build the iteration domain of the current nest and guards, with the
    /// parameter constraints intersected in.
    fn build_domain(&self, instance: &Space) -> ScopResult<Set> {
        let n_dim = instance.dim();
        let n_param = instance.n_param();
        let mut domain = Set::universe(instance.clone());

        for (depth, info) in self.loop_nest.iter().enumerate() {
            let iter_var = Aff::var(depth, n_dim, n_param);

            // Lower bounds may case-split on max: every branch is a valid
            // lower bound, so each surviving candidate becomes a constraint.
            let lowers = expr_to_aff_bounds(instance, info.lower, false, true);
            if lowers.is_empty() {
                return Err(ScopError::UnrepresentableBound {
                    var: info.var.name.clone(),
                    bound: info.lower.to_string(),
                });
            }
            for lo in lowers {
                domain.add_constraint(Constraint::ge(iter_var.clone(), lo));
            }

            // Upper bounds (exclusive) may case-split on min.
            let uppers = expr_to_aff_bounds(instance, info.upper, true, false);
            if uppers.is_empty() {
                return Err(ScopError::UnrepresentableBound {
                    var: info.var.name.clone(),
                    bound: info.upper.to_string(),
                });
            }
            for up in uppers {
                domain.add_constraint(Constraint::lt(iter_var.clone(), up));
            }
        }

        for guard in &self.guards {
            self.add_guard_constraints(&mut domain, instance, guard);
        }

        Ok(domain.intersect_params(self.param_set))
    }

    /// Intersect an affine guard into the domain, tolerantly: a conjunct
    /// that fails exact translation is dropped, which only loosens the
    /// domain.
    fn add_guard_constraints(&self, domain: &mut Set, instance: &Space, guard: &Cond) {
        match &guard.kind {
            CondKind::And(a, b) => {
                self.add_guard_constraints(domain, instance, a);
                self.add_guard_constraints(domain, instance, b);
            }
            CondKind::Cmp { op, left, right } => {
                let (l, r) = match (expr_to_aff(instance, left), expr_to_aff(instance, right)) {
                    (Ok(l), Ok(r)) => (l, r),
                    _ => {
                        debug!("dropping non-affine guard conjunct: {}", guard);
                        return;
                    }
                };
                let constraint = match op {
                    CmpOp::Lt => Constraint::lt(l, r),
                    CmpOp::Le => Constraint::le(l, r),
                    CmpOp::Gt => Constraint::lt(r, l),
                    CmpOp::Ge => Constraint::ge(l, r),
                    CmpOp::Eq => Constraint::eq(l, r),
                };
                domain.add_constraint(constraint);
            }
        }
    }

    /// Collect every tensor read in an expression, left to right, assigning
    /// relation identifiers as encountered.
    fn collect_reads(
        &self,
        e: &Expr,
        instance: &Space,
        accesses: &mut Accesses,
        reads: &mut Vec<AccessRelation>,
    ) -> ScopResult<()> {
        use crate::ir::ExprKind;
        match &e.kind {
            // Index expressions cannot hold further reads: build_access_maps
            // rejects any non-affine index, nested reads included.
            ExprKind::TensorRead { tensor, indices } => {
                let tensor_id = Id::new(tensor.as_str());
                let maps = build_access_maps(instance, &tensor_id, indices)?;
                reads.push(add_suffix_for_accesses(
                    accesses,
                    maps,
                    &tensor_id,
                    AccessKind::Read,
                    &self.ctx,
                )?);
                Ok(())
            }
            ExprKind::Binary { left, right, .. } => {
                self.collect_reads(left, instance, accesses, reads)?;
                self.collect_reads(right, instance, accesses, reads)
            }
            ExprKind::Neg(operand) => self.collect_reads(operand, instance, accesses, reads),
            ExprKind::Min(a, b) | ExprKind::Max(a, b) => {
                self.collect_reads(a, instance, accesses, reads)?;
                self.collect_reads(b, instance, accesses, reads)
            }
            ExprKind::FloorDiv { dividend, divisor } => {
                self.collect_reads(dividend, instance, accesses, reads)?;
                self.collect_reads(divisor, instance, accesses, reads)
            }
            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.collect_reads(arg, instance, accesses, reads)?;
                }
                Ok(())
            }
            ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::Var(_) => Ok(()),
        }
    }
}

/// Wrap a sequence child in a filter naming the statements below it.
fn wrap_in_filter(tree: ScheduleTree) -> ScheduleTree {
    let stmts = tree.leaves().into_iter().cloned().collect();
    ScheduleTree::filter(stmts, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scop::StmtOp;

    fn params(names: &[&str]) -> Vec<Var> {
        names.iter().map(|n| Var::new(*n)).collect()
    }

    /// param space + positivity set for the given names.
    fn setup(names: &[&str]) -> (Space, Set) {
        let ctx = Ctx::new();
        let vars = params(names);
        let space = create_params_space_with(&ctx, &vars);
        let mut set = Set::universe(space.clone());
        for i in 0..space.n_param() {
            let mut expr = Aff::param(i, 0, space.n_param());
            expr.constant = -1;
            set.add_constraint(Constraint::ge_zero(expr));
        }
        (space, set)
    }

    fn elementwise_loop() -> Stmt {
        // for i = 0 to N { C[i] = A[i] + B[i] }
        Stmt::for_loop(
            Var::new("i"),
            Expr::int(0),
            Expr::var("N"),
            Stmt::provide(
                "C",
                vec![Expr::var("i")],
                Expr::add(
                    Expr::read("A", vec![Expr::var("i")]),
                    Expr::read("B", vec![Expr::var("i")]),
                ),
            ),
        )
    }

    #[test]
    fn test_elementwise_scenario() {
        let (space, set) = setup(&["N"]);
        let mut info = ScopInfo::new(Ctx::new());
        let tree = make_schedule_tree(&space, &set, &elementwise_loop(), &mut info).unwrap();

        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(info.statements.len(), 1);

        let stmt = &info.statements[0];
        assert_eq!(stmt.id, Id::new("S0"));
        // { i : 0 <= i < N }
        assert!(stmt.domain.contains(&[0], &[10]));
        assert!(stmt.domain.contains(&[9], &[10]));
        assert!(!stmt.domain.contains(&[10], &[10]));
        assert!(!stmt.domain.contains(&[-1], &[10]));

        assert_eq!(stmt.reads.len(), 2);
        assert_eq!(stmt.reads[0].tensor, Id::new("A"));
        assert_eq!(stmt.reads[1].tensor, Id::new("B"));
        assert_eq!(stmt.writes.len(), 1);
        assert_eq!(stmt.writes[0].tensor, Id::new("C"));

        assert_eq!(info.analysis.stmt_op(&stmt.id), Some(StmtOp::Elementwise));
    }

    #[test]
    fn test_min_upper_bound_intersects() {
        // for i = 0 to min(N, M) { C[i] = 0 } : both i < N and i < M hold.
        let (space, set) = setup(&["N", "M"]);
        let stmt = Stmt::for_loop(
            Var::new("i"),
            Expr::int(0),
            Expr::min(Expr::var("N"), Expr::var("M")),
            Stmt::provide("C", vec![Expr::var("i")], Expr::int(0)),
        );
        let mut info = ScopInfo::new(Ctx::new());
        make_schedule_tree(&space, &set, &stmt, &mut info).unwrap();
        let domain = &info.statements[0].domain;
        assert!(domain.contains(&[4], &[10, 5]));
        assert!(!domain.contains(&[5], &[10, 5]));
        assert!(!domain.contains(&[5], &[5, 10]));
    }

    #[test]
    fn test_unrepresentable_bound_is_fatal() {
        // for i = 0 to N*N: no affine approximation of the upper bound.
        let (space, set) = setup(&["N"]);
        let stmt = Stmt::for_loop(
            Var::new("i"),
            Expr::int(0),
            Expr::mul(Expr::var("N"), Expr::var("N")),
            Stmt::provide("C", vec![Expr::var("i")], Expr::int(0)),
        );
        let mut info = ScopInfo::new(Ctx::new());
        let err = make_schedule_tree(&space, &set, &stmt, &mut info);
        assert!(matches!(
            err,
            Err(ScopError::UnrepresentableBound { .. })
        ));
        // No partial output.
        assert!(info.statements.is_empty());
    }

    #[test]
    fn test_guard_intersected() {
        // for i = 0 to N { if i >= 2 { C[i] = 0 } }
        let (space, set) = setup(&["N"]);
        let stmt = Stmt::for_loop(
            Var::new("i"),
            Expr::int(0),
            Expr::var("N"),
            Stmt::if_then(
                Cond::cmp(CmpOp::Ge, Expr::var("i"), Expr::int(2)),
                Stmt::provide("C", vec![Expr::var("i")], Expr::int(0)),
            ),
        );
        let mut info = ScopInfo::new(Ctx::new());
        make_schedule_tree(&space, &set, &stmt, &mut info).unwrap();
        let domain = &info.statements[0].domain;
        assert!(!domain.contains(&[1], &[10]));
        assert!(domain.contains(&[2], &[10]));
    }

    #[test]
    fn test_param_set_intersected() {
        let (space, set) = setup(&["N"]);
        let mut info = ScopInfo::new(Ctx::new());
        make_schedule_tree(&space, &set, &elementwise_loop(), &mut info).unwrap();
        // N >= 1 from the parameter set: N = 0 excludes every point.
        assert!(!info.statements[0].domain.contains(&[0], &[0]));
    }

    #[test]
    fn test_leaves_follow_lexical_order() {
        // for i { A[i] = 0; B[i] = 1 }; C[0] = 2
        let (space, set) = setup(&["N"]);
        let stmt = Stmt::seq(vec![
            Stmt::for_loop(
                Var::new("i"),
                Expr::int(0),
                Expr::var("N"),
                Stmt::seq(vec![
                    Stmt::provide("A", vec![Expr::var("i")], Expr::int(0)),
                    Stmt::provide("B", vec![Expr::var("i")], Expr::int(1)),
                ]),
            ),
            Stmt::provide("C", vec![Expr::int(0)], Expr::int(2)),
        ]);
        let mut info = ScopInfo::new(Ctx::new());
        let tree = make_schedule_tree(&space, &set, &stmt, &mut info).unwrap();
        let leaves: Vec<String> = tree.leaves().iter().map(|id| id.to_string()).collect();
        assert_eq!(leaves, vec!["S0", "S1", "S2"]);
        assert_eq!(info.statements.len(), 3);
    }

    #[test]
    fn test_statement_visit_is_deterministic() {
        let (space, set) = setup(&["N"]);
        // D[i] = A[i] * A[i + 1]: two distinct accesses to A.
        let stmt = Stmt::for_loop(
            Var::new("i"),
            Expr::int(0),
            Expr::var("N"),
            Stmt::provide(
                "D",
                vec![Expr::var("i")],
                Expr::mul(
                    Expr::read("A", vec![Expr::var("i")]),
                    Expr::read("A", vec![Expr::add(Expr::var("i"), Expr::int(1))]),
                ),
            ),
        );
        let run = || {
            let mut info = ScopInfo::new(Ctx::new());
            make_schedule_tree(&space, &set, &stmt, &mut info).unwrap();
            info.statements[0]
                .reads
                .iter()
                .map(|r| r.id.to_string())
                .collect::<Vec<_>>()
        };
        let first = run();
        assert_eq!(first, vec!["A", "A_1"]);
        assert_eq!(first, run());
    }
}

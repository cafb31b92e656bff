//! Schedule trees.
//!
//! A schedule tree encodes execution order over statement instances: band
//! nodes carry loop dimensions, sequence nodes carry lexical order between
//! their filtered children, and leaves are statement instances. The builder
//! emits a tree that faithfully encodes the original lexical/loop order; an
//! external scheduler later rewrites it.

use crate::poly::set::Set;
use crate::poly::Id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of a schedule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleTree {
    /// Root node carrying the iteration domain of every statement.
    Domain {
        /// Per-statement instance sets, in lexical order.
        domains: Vec<(Id, Set)>,
        /// The schedule below the root.
        child: Box<ScheduleTree>,
    },
    /// A band of loop dimensions applying to everything below it.
    Band {
        /// Member dimension names, outermost first.
        members: Vec<String>,
        /// The subtree inside the band.
        child: Box<ScheduleTree>,
    },
    /// Lexical order between children.
    Sequence(Vec<ScheduleTree>),
    /// Restriction of the parent's instances to the named statements.
    Filter {
        /// Statements flowing into the child.
        stmts: Vec<Id>,
        /// The filtered subtree.
        child: Box<ScheduleTree>,
    },
    /// A statement instance.
    Leaf(Id),
}

impl ScheduleTree {
    /// Wrap a child in a band node.
    pub fn band(members: Vec<String>, child: ScheduleTree) -> Self {
        Self::Band {
            members,
            child: Box::new(child),
        }
    }

    /// Wrap a child in a filter node.
    pub fn filter(stmts: Vec<Id>, child: ScheduleTree) -> Self {
        Self::Filter {
            stmts,
            child: Box::new(child),
        }
    }

    /// Statement leaves in order (in-order traversal), which for a freshly
    /// built tree is the original lexical order.
    pub fn leaves(&self) -> Vec<&Id> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Id>) {
        match self {
            ScheduleTree::Domain { child, .. }
            | ScheduleTree::Band { child, .. }
            | ScheduleTree::Filter { child, .. } => child.collect_leaves(out),
            ScheduleTree::Sequence(children) => {
                for c in children {
                    c.collect_leaves(out);
                }
            }
            ScheduleTree::Leaf(id) => out.push(id),
        }
    }

    /// Number of statement leaves.
    pub fn n_leaves(&self) -> usize {
        self.leaves().len()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            ScheduleTree::Domain { domains, child } => {
                writeln!(f, "{}domain:", pad)?;
                for (id, set) in domains {
                    writeln!(f, "{}  {}: {}", pad, id, set)?;
                }
                child.fmt_indented(f, indent + 1)
            }
            ScheduleTree::Band { members, child } => {
                writeln!(f, "{}band [{}]", pad, members.join(", "))?;
                child.fmt_indented(f, indent + 1)
            }
            ScheduleTree::Sequence(children) => {
                writeln!(f, "{}sequence", pad)?;
                for c in children {
                    c.fmt_indented(f, indent + 1)?;
                }
                Ok(())
            }
            ScheduleTree::Filter { stmts, child } => {
                let names: Vec<&str> = stmts.iter().map(|s| s.as_str()).collect();
                writeln!(f, "{}filter {{{}}}", pad, names.join(", "))?;
                child.fmt_indented(f, indent + 1)
            }
            ScheduleTree::Leaf(id) => writeln!(f, "{}leaf {}", pad, id),
        }
    }
}

impl fmt::Display for ScheduleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

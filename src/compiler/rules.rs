//! Rewrite rules applied before translation.
//!
//! A rule turns a node with no direct translator into an equivalent tree of
//! supported operations. The pass runs once, top-down: a matching node is
//! rewritten, then the rewritten node's operands are visited. No rule
//! produces a rewritable kind at its root, so running the pass on its own
//! output changes nothing.

use std::collections::BTreeMap;

use crate::ir::{OpKind, OpNode, Relation, ValueExpr};

/// A pure tree substitution.
pub type RewriteFn = fn(OpNode) -> ValueExpr;

/// Rewrite rules keyed by the operation kind they replace.
#[derive(Debug, Clone)]
pub struct RewriteRules {
    rules: BTreeMap<OpKind, RewriteFn>,
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self::base()
    }
}

impl RewriteRules {
    /// The dialect-independent rule set.
    pub fn base() -> Self {
        let mut rules: BTreeMap<OpKind, RewriteFn> = BTreeMap::new();
        rules.insert(OpKind::Between, rewrite_between);
        rules.insert(OpKind::NotNull, rewrite_not_null);
        rules.insert(OpKind::IfNull, rewrite_if_null);
        Self { rules }
    }

    /// Add or replace rules. Rules are never removed.
    pub fn extend(mut self, extra: impl IntoIterator<Item = (OpKind, RewriteFn)>) -> Self {
        self.rules.extend(extra);
        self
    }

    /// Whether `kind` is rewritten away.
    pub fn rewrites(&self, kind: OpKind) -> bool {
        self.rules.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = OpKind> + '_ {
        self.rules.keys().copied()
    }

    /// Rewrite a scalar expression.
    pub fn apply(&self, expr: ValueExpr) -> ValueExpr {
        match expr {
            ValueExpr::Op(node) => {
                let rewritten = match self.rules.get(&node.kind) {
                    Some(rule) if well_formed(&node) => rule(node),
                    _ => ValueExpr::Op(node),
                };
                match rewritten {
                    ValueExpr::Op(node) => ValueExpr::Op(self.apply_children(node)),
                    leaf => leaf,
                }
            }
            leaf => leaf,
        }
    }

    /// Rewrite every expression embedded in a relation.
    pub fn apply_relation(&self, relation: Relation) -> Relation {
        relation.map_expressions(&mut |e| self.apply(e))
    }

    fn apply_children(&self, node: OpNode) -> OpNode {
        OpNode {
            kind: node.kind,
            args: node.args.into_iter().map(|a| self.apply(a)).collect(),
            ty: node.ty,
            filter: node.filter.map(|f| Box::new(self.apply(*f))),
        }
    }
}

/// Rules destructure their operands positionally; a node with the wrong
/// operand count is left alone so the translator reports it.
fn well_formed(node: &OpNode) -> bool {
    let expected = match node.kind {
        OpKind::Between => 3,
        OpKind::NotNull => 1,
        OpKind::IfNull => 2,
        _ => return true,
    };
    node.args.len() == expected
}

fn rewrite_between(node: OpNode) -> ValueExpr {
    let mut args = node.args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(x), Some(lo), Some(hi)) => x.clone().ge(lo).and(x.le(hi)),
        // unreachable past `well_formed`; rebuild the node unchanged
        (x, lo, hi) => ValueExpr::op(
            OpKind::Between,
            [x, lo, hi].into_iter().flatten().collect(),
        ),
    }
}

fn rewrite_not_null(node: OpNode) -> ValueExpr {
    !ValueExpr::op(OpKind::IsNull, node.args)
}

fn rewrite_if_null(node: OpNode) -> ValueExpr {
    ValueExpr::op(OpKind::Coalesce, node.args)
}

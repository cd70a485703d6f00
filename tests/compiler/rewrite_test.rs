//! Rewrite rules: normalization before translation.

#[path = "../common/mod.rs"]
mod common;

use mssql_compiler::compiler::{compile, Expression, MsSqlDialect, Params, RewriteFn, RewriteRules};
use mssql_compiler::ir::{coalesce, OpKind, OpNode, Relation, ValueExpr};

use common::{alltypes, assert_parses};

fn samples() -> Vec<ValueExpr> {
    let t = alltypes();
    vec![
        t.col("int_col").between(1, 5),
        t.col("string_col").not_null(),
        t.col("string_col").if_null("x").length(),
        t.col("int_col")
            .if_null(t.col("bigint_col"))
            .between(t.col("smallint_col"), 10)
            .not_null(),
        t.col("double_col").sum().filter(t.col("int_col").between(0, 3)),
        t.col("int_col").between(1, 2).and(t.col("id").not_null()),
        t.col("double_col") + 1,
    ]
}

#[test]
fn test_rewrite_is_idempotent() {
    let rules = RewriteRules::base();
    for expr in samples() {
        let once = rules.apply(expr.clone());
        let twice = rules.apply(once.clone());
        assert_eq!(once, twice, "rewriting {} twice changed it", expr);
    }
}

#[test]
fn test_rewritten_trees_have_no_rewritable_kinds() {
    fn kinds(expr: &ValueExpr, out: &mut Vec<OpKind>) {
        if let ValueExpr::Op(node) = expr {
            out.push(node.kind);
            node.args.iter().for_each(|a| kinds(a, out));
            if let Some(f) = &node.filter {
                kinds(f, out);
            }
        }
    }

    let rules = RewriteRules::base();
    for expr in samples() {
        let mut seen = Vec::new();
        kinds(&rules.apply(expr), &mut seen);
        assert!(seen.iter().all(|k| !rules.rewrites(*k)), "left over: {:?}", seen);
    }
}

#[test]
fn test_dialect_uses_base_rules() {
    let rules = MsSqlDialect::get().rewrite_rules();
    let kinds: Vec<OpKind> = rules.kinds().collect();
    assert_eq!(kinds, vec![OpKind::Between, OpKind::NotNull, OpKind::IfNull]);
}

#[test]
fn test_if_null_becomes_coalesce() {
    let t = alltypes();
    let rules = RewriteRules::base();
    assert_eq!(
        rules.apply(t.col("string_col").if_null("x")),
        coalesce(vec![t.col("string_col"), "x".into()])
    );
}

#[test]
fn test_relation_expressions_are_rewritten() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("int_col").between(1, 5)])
        .select(vec![t.col("string_col").if_null("-").name("s")]);

    let rewritten = Expression::from(rel).rewrite(&RewriteRules::base());
    let Expression::Relation(Relation::Selection(sel)) = rewritten else {
        panic!("expected a selection");
    };
    assert_eq!(
        sel.predicates,
        vec![t.col("int_col").ge(1).and(t.col("int_col").le(5))]
    );
    assert_eq!(
        sel.projections[0].expr,
        coalesce(vec![t.col("string_col"), "-".into()])
    );
}

#[test]
fn test_between_in_where_clause() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("int_col").between(1, 5)]);
    let sql = compile(rel, &Params::new()).unwrap().to_sql();
    assert_parses(&sql);
    insta::assert_snapshot!(sql, @r"
    SELECT
      [t0].*
    FROM [functional_alltypes] AS [t0]
    WHERE ([t0].[int_col] >= 1) AND ([t0].[int_col] <= 5)
    ");
}

#[test]
fn test_extension_rules_apply() {
    fn hash_to_length(node: OpNode) -> ValueExpr {
        ValueExpr::op(OpKind::StringLength, node.args)
    }
    let rules = RewriteRules::base().extend([(OpKind::Hash, hash_to_length as RewriteFn)]);

    let t = alltypes();
    assert_eq!(
        rules.apply(t.col("string_col").hash().between(1, 2)),
        t.col("string_col")
            .length()
            .ge(1)
            .and(t.col("string_col").length().le(2))
    );
}

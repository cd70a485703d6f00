//! Whole statements compiled from relations.

#[path = "../common/mod.rs"]
mod common;

use mssql_compiler::compiler::{compile, CompileError, Params};
use mssql_compiler::ir::{lit, JoinKind, SortKey, TableExpr};

use common::{alltypes, assert_parses, customers, orders};

fn sql(expr: impl Into<mssql_compiler::compiler::Expression>) -> String {
    let sql = compile(expr, &Params::new()).unwrap().to_sql();
    assert_parses(&sql);
    sql
}

#[test]
fn test_table_selects_everything() {
    let t = alltypes();
    insta::assert_snapshot!(sql(&t), @r"
    SELECT
      [t0].*
    FROM [functional_alltypes] AS [t0]
    ");
}

#[test]
fn test_scalar_root_is_named_tmp() {
    let t = alltypes();
    insta::assert_snapshot!(sql(t.col("double_col") + 1), @r"
    SELECT
      [t0].[double_col] + 1 AS [tmp]
    FROM [functional_alltypes] AS [t0]
    ");
}

#[test]
fn test_scalar_without_table_has_no_from() {
    assert_eq!(sql(lit(1) + 2), "SELECT\n  1 + 2 AS [tmp]");
}

#[test]
fn test_selection_with_everything() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("int_col").gt(0)])
        .select(vec![
            t.col("id").name("id"),
            (t.col("double_col") * 2).name("dbl"),
        ])
        .order_by(vec![SortKey::desc(t.col("id"))])
        .limit(10, 5);

    insta::assert_snapshot!(sql(rel), @r"
    SELECT
      [t0].[id],
      [t0].[double_col] * 2 AS [dbl]
    FROM [functional_alltypes] AS [t0]
    WHERE [t0].[int_col] > 0
    ORDER BY [t0].[id] DESC
    OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY
    ");
}

#[test]
fn test_multiple_filters_are_conjoined() {
    let t = alltypes();
    let rel = t.relation().filter(vec![
        t.col("int_col").gt(0).or(t.col("int_col").lt(10)),
        t.col("bool_col"),
    ]);
    insta::assert_snapshot!(sql(rel), @r"
    SELECT
      [t0].*
    FROM [functional_alltypes] AS [t0]
    WHERE (([t0].[int_col] > 0) OR ([t0].[int_col] < 10)) AND [t0].[bool_col] = 1
    ");
}

#[test]
fn test_limit_without_order_gets_placeholder() {
    let t = alltypes();
    insta::assert_snapshot!(sql(t.relation().limit(10, 0)), @r"
    SELECT
      [t0].*
    FROM [functional_alltypes] AS [t0]
    ORDER BY (SELECT NULL)
    OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY
    ");
}

#[test]
fn test_grouped_aggregation() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("bool_col")])
        .group_by(vec![t.col("string_col").name("string_col")])
        .aggregate(vec![
            t.col("double_col").sum().name("total"),
            t.col("id").count().name("n"),
        ])
        .filter(vec![t.col("double_col").sum().gt(100)]);

    insta::assert_snapshot!(sql(rel), @r"
    SELECT
      [t0].[string_col],
      SUM([t0].[double_col]) AS [total],
      COUNT([t0].[id]) AS [n]
    FROM [functional_alltypes] AS [t0]
    WHERE [t0].[bool_col] = 1
    GROUP BY [t0].[string_col]
    HAVING SUM([t0].[double_col]) > 100
    ");
}

#[test]
fn test_whole_table_aggregate() {
    let t = alltypes();
    let rel = t
        .relation()
        .aggregate(vec![t.col("bool_col").mean().name("ratio")]);
    insta::assert_snapshot!(sql(rel), @r"
    SELECT
      AVG(CAST([t0].[bool_col] AS REAL)) AS [ratio]
    FROM [functional_alltypes] AS [t0]
    ");
}

#[test]
fn test_left_join_with_schema() {
    let (o, c) = (orders(), customers());
    let rel = o
        .relation()
        .join(&c, JoinKind::Left, vec![o.col("customer_id").eq(c.col("id"))])
        .select(vec![
            o.col("amount").name("amount"),
            c.col("name").name("customer"),
        ]);

    insta::assert_snapshot!(sql(rel), @r"
    SELECT
      [t0].[amount],
      [t1].[name] AS [customer]
    FROM [sales].[orders] AS [t0]
    LEFT OUTER JOIN [customers] AS [t1] ON [t0].[customer_id] = [t1].[id]
    ");
}

#[test]
fn test_cross_join_selects_both_sides() {
    let (o, c) = (orders(), customers());
    let rel = o.relation().join(&c, JoinKind::Inner, vec![]);
    insta::assert_snapshot!(sql(rel), @r"
    SELECT
      [t0].*,
      [t1].*
    FROM [sales].[orders] AS [t0]
    INNER JOIN [customers] AS [t1] ON 1 = 1
    ");
}

#[test]
fn test_outer_join_is_full() {
    let (o, c) = (orders(), customers());
    let rel = o.relation().join(
        &c,
        JoinKind::Outer,
        vec![o.col("customer_id").eq(c.col("id")), c.col("name").eq("acme")],
    );
    let sql = sql(rel);
    assert!(sql.contains(
        "FULL OUTER JOIN [customers] AS [t1] ON ([t0].[customer_id] = [t1].[id]) AND ([t1].[name] = 'acme')"
    ));
}

#[test]
fn test_self_join_rejected() {
    let t = alltypes();
    let rel = t.relation().join(&t, JoinKind::Inner, vec![]);
    assert!(matches!(
        compile(rel, &Params::new()),
        Err(CompileError::InvalidExpression(_))
    ));
}

#[test]
fn test_scalar_over_two_tables_rejected() {
    let (o, c) = (orders(), customers());
    let err = compile(o.col("id") + c.col("id"), &Params::new()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidExpression(_)));
}

#[test]
fn test_column_from_other_table_rejected() {
    let (o, c) = (orders(), customers());
    let rel = o.relation().filter(vec![c.col("id").eq(1)]);
    assert_eq!(
        compile(rel, &Params::new()),
        Err(CompileError::UnknownTable("customers".into()))
    );
}

#[test]
fn test_unknown_column_rejected() {
    let t = TableExpr::new("t", vec![]);
    assert!(matches!(
        compile(t.col("missing"), &Params::new()),
        Err(CompileError::UnknownColumn { .. })
    ));
}

#[test]
fn test_nested_selection_rejected() {
    let t = alltypes();
    let rel = t
        .relation()
        .select(vec![t.col("id").name("id")])
        .filter(vec![t.col("id").gt(1)]);
    assert!(matches!(
        compile(rel, &Params::new()),
        Err(CompileError::InvalidExpression(_))
    ));
}

#[test]
fn test_empty_aggregation_rejected() {
    let t = alltypes();
    let err = compile(t.relation().aggregate(vec![]), &Params::new()).unwrap_err();
    assert!(err.to_string().contains("at least one grouping key or metric"));
}

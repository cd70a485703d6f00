//! Lowering of scalar roots and relations into SELECT statements.

use crate::ir::{
    Aggregation, Join, JoinKind, Named, Relation, Selection, SortKey, TableName, ValueExpr,
};
use crate::sql::expr::{table_star, Expr};
use crate::sql::query::{JoinType, OrderByExpr, Query, SelectExpr, TableRef};

use super::error::{CompileError, CompileResult};
use super::translator::ExprTranslator;
use super::Expression;

/// Output name of an unnamed scalar root.
pub const SCALAR_ALIAS: &str = "tmp";

pub(crate) fn compile_expression(
    t: &mut ExprTranslator<'_>,
    expr: &Expression,
) -> CompileResult<Query> {
    match expr {
        Expression::Scalar { expr, name } => {
            compile_scalar(t, expr, name.as_deref().unwrap_or(SCALAR_ALIAS))
        }
        Expression::Relation(rel) => compile_relation(t, rel),
    }
}

/// `SELECT <expr> AS [name] FROM <table>`
fn compile_scalar(t: &mut ExprTranslator<'_>, expr: &ValueExpr, name: &str) -> CompileResult<Query> {
    let tables = expr.tables();
    if tables.len() > 1 {
        let names: Vec<String> = tables.iter().map(TableName::to_string).collect();
        return Err(CompileError::InvalidExpression(format!(
            "scalar expression references {} tables ({}); join them into a relation first",
            tables.len(),
            names.join(", ")
        )));
    }

    let mut query = Query::new();
    if let Some(table) = tables.first() {
        let alias = t.context_mut().register_table(table)?;
        query = query.from(table_ref(table, &alias));
    }

    let value = t.translate(expr)?;
    Ok(query.select(vec![SelectExpr::new(value).with_alias(name)]))
}

fn compile_relation(t: &mut ExprTranslator<'_>, rel: &Relation) -> CompileResult<Query> {
    match rel {
        Relation::Table(_) | Relation::Join(_) => {
            let query = compile_source(t, rel)?;
            Ok(query.select(all_columns(t)))
        }
        Relation::Selection(sel) => compile_selection(t, sel),
        Relation::Aggregation(agg) => compile_aggregation(t, agg),
    }
}

/// FROM and JOIN clauses. Registers table aliases left to right.
fn compile_source(t: &mut ExprTranslator<'_>, rel: &Relation) -> CompileResult<Query> {
    match rel {
        Relation::Table(table) => {
            let alias = t.context_mut().register_table(&table.name)?;
            Ok(Query::new().from(table_ref(&table.name, &alias)))
        }
        Relation::Join(join) => compile_join(t, join),
        Relation::Selection(_) | Relation::Aggregation(_) => Err(CompileError::InvalidExpression(
            "nested selections and aggregations cannot be used as a source".into(),
        )),
    }
}

fn compile_join(t: &mut ExprTranslator<'_>, join: &Join) -> CompileResult<Query> {
    let query = compile_source(t, &join.left)?;

    let right = match join.right.as_ref() {
        Relation::Table(table) => &table.name,
        _ => {
            return Err(CompileError::InvalidExpression(
                "the right side of a join must be a table".into(),
            ))
        }
    };
    let alias = t.context_mut().register_table(right)?;

    let on = and_all(t, &join.predicates)?;
    let join_type = match join.kind {
        JoinKind::Inner => JoinType::Inner,
        JoinKind::Left => JoinType::Left,
        JoinKind::Right => JoinType::Right,
        JoinKind::Outer => JoinType::Full,
    };
    Ok(query.join(join_type, table_ref(right, &alias), on))
}

fn compile_selection(t: &mut ExprTranslator<'_>, sel: &Selection) -> CompileResult<Query> {
    let mut query = compile_source(t, &sel.source)?;

    let select = if sel.projections.is_empty() {
        all_columns(t)
    } else {
        named_items(t, &sel.projections)?
    };
    query = query.select(select);

    for predicate in &sel.predicates {
        query = query.filter(t.translate_condition(predicate)?);
    }

    query = query.order_by(sort_keys(t, &sel.sort_keys)?);
    if let Some(limit) = sel.limit {
        query = query.limit(limit.n).offset(limit.offset);
    }
    Ok(query)
}

fn compile_aggregation(t: &mut ExprTranslator<'_>, agg: &Aggregation) -> CompileResult<Query> {
    if agg.by.is_empty() && agg.metrics.is_empty() {
        return Err(CompileError::InvalidExpression(
            "aggregation needs at least one grouping key or metric".into(),
        ));
    }

    let mut query = compile_source(t, &agg.source)?;

    for predicate in &agg.predicates {
        query = query.filter(t.translate_condition(predicate)?);
    }

    let mut select = named_items(t, &agg.by)?;
    let group_by = select.iter().map(|item| item.expr.clone()).collect();
    select.extend(named_items(t, &agg.metrics)?);
    query = query.select(select).group_by(group_by);

    for predicate in &agg.having {
        query = query.having(t.translate_condition(predicate)?);
    }

    query = query.order_by(sort_keys(t, &agg.sort_keys)?);
    if let Some(limit) = agg.limit {
        query = query.limit(limit.n).offset(limit.offset);
    }
    Ok(query)
}

// =============================================================================
// Helpers
// =============================================================================

fn table_ref(table: &TableName, alias: &str) -> TableRef {
    TableRef::new(&table.name)
        .with_schema(table.schema.as_deref())
        .with_alias(alias)
}

/// `[t0].*, [t1].*, ...` for every table registered so far.
fn all_columns(t: &ExprTranslator<'_>) -> Vec<SelectExpr> {
    t.context()
        .aliases()
        .map(|alias| SelectExpr::new(table_star(alias)))
        .collect()
}

/// Select items with output names. A column that already carries the
/// requested name is not re-aliased.
fn named_items(
    t: &mut ExprTranslator<'_>,
    items: &[Named<ValueExpr>],
) -> CompileResult<Vec<SelectExpr>> {
    items
        .iter()
        .map(|item| {
            let value = t.translate(&item.expr)?;
            let same_name = matches!(&item.expr, ValueExpr::Column { name, .. } if *name == item.name);
            Ok(if same_name {
                SelectExpr::new(value)
            } else {
                SelectExpr::new(value).with_alias(&item.name)
            })
        })
        .collect()
}

fn sort_keys(t: &mut ExprTranslator<'_>, keys: &[SortKey]) -> CompileResult<Vec<OrderByExpr>> {
    keys.iter()
        .map(|key| {
            let value = t.translate(&key.expr)?;
            Ok(if key.descending {
                OrderByExpr::desc(value)
            } else {
                OrderByExpr::asc(value)
            })
        })
        .collect()
}

/// AND together join predicates; `None` when there are none.
fn and_all(t: &mut ExprTranslator<'_>, predicates: &[ValueExpr]) -> CompileResult<Option<Expr>> {
    let mut combined: Option<Expr> = None;
    for predicate in predicates {
        let cond = t.translate_condition(predicate)?;
        combined = Some(match combined {
            Some(existing) => Expr::binary(
                existing.nested(),
                crate::sql::expr::BinaryOperator::And,
                cond.nested(),
            ),
            None => cond,
        });
    }
    Ok(combined)
}

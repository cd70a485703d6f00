//! Expression translator: `ValueExpr` to native `sql::Expr`.
//!
//! A single recursive descent. Leaves render directly; operation nodes are
//! dispatched through the dialect's `OperationRegistry`, and each translator
//! recurses back into `translate` for its operands.
//!
//! SQL Server has no boolean value type, so every expression is translated
//! in one of two contexts:
//!
//! - value context (`translate`): predicates become
//!   `CASE WHEN p THEN 1 ELSE 0 END`
//! - condition context (`translate_condition`): boolean values become
//!   `x = 1`

use crate::ir::{LogicalType, OpKind, OpNode, Value, ValueExpr};
use crate::sql::expr::{
    func, lit_int, lit_null, raw_sql, BinaryOperator, Expr, Literal, UnaryOperator,
};

use super::context::CompileContext;
use super::dialect::MsSqlDialect;
use super::error::{CompileError, CompileResult, UnsupportedOperationError};
use super::registry::Translator;

/// Translates expressions for one `compile` call.
#[derive(Debug)]
pub struct ExprTranslator<'a> {
    dialect: &'a MsSqlDialect,
    ctx: CompileContext<'a>,
}

impl<'a> ExprTranslator<'a> {
    pub fn new(dialect: &'a MsSqlDialect, ctx: CompileContext<'a>) -> Self {
        Self { dialect, ctx }
    }

    pub fn context(&self) -> &CompileContext<'a> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut CompileContext<'a> {
        &mut self.ctx
    }

    pub fn into_context(self) -> CompileContext<'a> {
        self.ctx
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Translate `expr` where a value is expected.
    pub fn translate(&mut self, expr: &ValueExpr) -> CompileResult<Expr> {
        match expr {
            ValueExpr::Literal { value, ty } => self.translate_literal(value, ty.as_ref()),

            ValueExpr::Column { table, name, ty } => {
                if ty.is_none() {
                    return Err(CompileError::UnknownColumn {
                        table: table.to_string(),
                        column: name.clone(),
                    });
                }
                let alias = self.ctx.alias_for(table)?;
                Ok(Expr::Column {
                    table: Some(alias.to_string()),
                    column: name.clone(),
                })
            }

            ValueExpr::Param { name, .. } => {
                self.ctx.record_param(name)?;
                Ok(Expr::Param(name.clone()))
            }

            ValueExpr::Op(node) => {
                let native = self.translate_node(node)?;
                if node.kind.is_predicate() {
                    Ok(Expr::case_when(native, lit_int(1), lit_int(0)))
                } else {
                    Ok(native)
                }
            }
        }
    }

    /// Translate `expr` where a condition is expected (WHERE, HAVING, ON,
    /// CASE WHEN).
    pub fn translate_condition(&mut self, expr: &ValueExpr) -> CompileResult<Expr> {
        match expr {
            ValueExpr::Op(node) if node.kind.is_predicate() => self.translate_node(node),
            ValueExpr::Literal {
                value: Value::Bool(b),
                ty: None,
            } => Ok(Expr::binary(
                lit_int(1),
                BinaryOperator::Eq,
                lit_int(if *b { 1 } else { 0 }),
            )),
            other => {
                if other.output_type() != Some(LogicalType::Boolean) {
                    return Err(CompileError::InvalidExpression(format!(
                        "{} is not a boolean condition",
                        other
                    )));
                }
                let value = self.translate(other)?;
                Ok(Expr::binary(value.nested(), BinaryOperator::Eq, lit_int(1)))
            }
        }
    }

    /// Native type name for `ty`, as used inside `CAST`.
    pub fn native_type(&self, ty: &LogicalType) -> CompileResult<String> {
        let mapper = self.dialect.type_mapper();
        let native = mapper.map(ty)?;
        if mapper.narrows_precision(ty) {
            tracing::debug!(logical = %ty, native = %native, "cast narrows precision");
        }
        Ok(native.to_string())
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    fn translate_literal(
        &mut self,
        value: &Value,
        ty: Option<&LogicalType>,
    ) -> CompileResult<Expr> {
        let rendered = match value {
            Value::Null => lit_null(),
            Value::Bool(b) => Expr::Literal(Literal::Bool(*b)),
            Value::Int(n) => lit_int(*n),
            Value::Float(x) => {
                if !x.is_finite() {
                    return Err(CompileError::InvalidExpression(format!(
                        "float literal {} has no SQL representation",
                        x
                    )));
                }
                Expr::Literal(Literal::Float(*x))
            }
            Value::String(s) => Expr::Literal(Literal::String(s.clone())),
            Value::Date(d) => Expr::Literal(Literal::Date(d.format("%Y-%m-%d").to_string())),
            Value::Timestamp(ts) => {
                let text = ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
                Expr::Literal(Literal::String(text))
                    .cast(self.native_type(&LogicalType::Timestamp)?)
            }
        };

        match ty {
            Some(ty) if Some(ty) != value.natural_type().as_ref() => {
                Ok(rendered.cast(self.native_type(ty)?))
            }
            _ => Ok(rendered),
        }
    }

    // =========================================================================
    // Operation nodes
    // =========================================================================

    fn translate_node(&mut self, node: &OpNode) -> CompileResult<Expr> {
        let dialect = self.dialect;
        let translator = dialect.registry().lookup(node)?;

        match translator {
            Translator::Unary(name) => {
                check_arity(node, 1, 1)?;
                let arg = self.translate(&node.args[0])?;
                Ok(func(name, vec![arg]))
            }
            Translator::FixedArity(name, arity) => {
                check_arity(node, *arity, *arity)?;
                let args = self.translate_all(&node.args)?;
                Ok(func(name, args))
            }
            Translator::Variadic(name) => {
                check_arity(node, 1, usize::MAX)?;
                let args = self.translate_all(&node.args)?;
                Ok(func(name, args))
            }
            Translator::Binary(op) => {
                check_arity(node, 2, 2)?;
                let left = self.translate(&node.args[0])?;
                let right = self.translate(&node.args[1])?;
                Ok(Expr::binary(left.nested(), *op, right.nested()))
            }
            Translator::Reduction { func, bool_cast } => {
                self.translate_reduction(func, bool_cast.as_ref(), node)
            }
            Translator::Custom(f) => f(self, node),
            Translator::Unsupported => Err(UnsupportedOperationError {
                op: node.kind,
                node: node.to_string(),
            }
            .into()),
        }
    }

    fn translate_all(&mut self, args: &[ValueExpr]) -> CompileResult<Vec<Expr>> {
        args.iter().map(|arg| self.translate(arg)).collect()
    }

    /// `f(arg)` with the boolean cast and `CASE WHEN filter` wrapping.
    fn translate_reduction(
        &mut self,
        func_name: &str,
        bool_cast: Option<&LogicalType>,
        node: &OpNode,
    ) -> CompileResult<Expr> {
        check_arity(node, 1, 1)?;
        let arg = &node.args[0];
        let mut value = self.translate(arg)?;

        if let Some(cast_ty) = bool_cast {
            if arg.output_type() == Some(LogicalType::Boolean) {
                value = value.cast(self.native_type(cast_ty)?);
            }
        }

        // Filtered-out rows become NULL, which aggregates skip
        if let Some(filter) = &node.filter {
            let cond = self.translate_condition(filter)?;
            value = Expr::case_when(cond, value, lit_null());
        }

        Ok(func(func_name, vec![value]))
    }
}

fn check_arity(node: &OpNode, min: usize, max: usize) -> CompileResult<()> {
    let found = node.args.len();
    if found >= min && found <= max {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("at least {}", min)
    } else {
        format!("{} to {}", min, max)
    };
    Err(CompileError::InvalidArity {
        op: node.kind,
        expected,
        found,
    })
}

// =============================================================================
// Custom translators
// =============================================================================

/// `x IN (...)` / `x NOT IN (...)`
pub(crate) fn is_in(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 1, usize::MAX)?;
    let expr = t.translate(&node.args[0])?;
    let values = t.translate_all(&node.args[1..])?;
    Ok(Expr::In {
        expr: Box::new(expr.nested()),
        values,
        negated: node.kind == OpKind::NotIn,
    })
}

/// `AND` / `OR` over conditions.
pub(crate) fn logical(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 2, 2)?;
    let op = if node.kind == OpKind::Or {
        BinaryOperator::Or
    } else {
        BinaryOperator::And
    };
    let left = t.translate_condition(&node.args[0])?;
    let right = t.translate_condition(&node.args[1])?;
    Ok(Expr::binary(left.nested(), op, right.nested()))
}

/// `NOT (cond)`
pub(crate) fn not(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 1, 1)?;
    let cond = t.translate_condition(&node.args[0])?;
    Ok(Expr::UnaryOp {
        op: UnaryOperator::Not,
        expr: Box::new(Expr::Paren(Box::new(cond))),
    })
}

/// `x IS NULL`
pub(crate) fn is_null(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 1, 1)?;
    let value = t.translate(&node.args[0])?;
    Ok(Expr::IsNull {
        expr: Box::new(value.nested()),
        negated: false,
    })
}

/// `-x`
pub(crate) fn negate(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 1, 1)?;
    let value = match t.translate(&node.args[0])? {
        v @ (Expr::Column { .. } | Expr::Function { .. } | Expr::Param(_)) => v,
        // "--" starts a comment
        other => Expr::Paren(Box::new(other)),
    };
    Ok(Expr::UnaryOp {
        op: UnaryOperator::Minus,
        expr: Box::new(value),
    })
}

/// `CASE WHEN cond THEN a ELSE b END`
pub(crate) fn if_else(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 3, 3)?;
    let cond = t.translate_condition(&node.args[0])?;
    let then = t.translate(&node.args[1])?;
    let otherwise = t.translate(&node.args[2])?;
    Ok(Expr::case_when(cond, then, otherwise))
}

/// `CAST(x AS native)`
pub(crate) fn cast(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 1, 1)?;
    let target = node.ty.as_ref().ok_or_else(|| {
        CompileError::InvalidExpression(format!("{} has no target type", node))
    })?;
    let value = t.translate(&node.args[0])?;
    Ok(value.cast(t.native_type(target)?))
}

/// `CHARINDEX(needle, haystack[, start]) - 1`
///
/// CHARINDEX is 1-based and returns 0 when absent, so subtracting one gives
/// a 0-based position or -1.
pub(crate) fn string_find(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 2, 3)?;
    let haystack = t.translate(&node.args[0])?;
    let needle = t.translate(&node.args[1])?;

    let mut args = vec![needle, haystack];
    if let Some(start) = node.arg(2) {
        args.push(t.translate(start)?);
    }

    Ok(Expr::binary(
        func("charindex", args),
        BinaryOperator::Minus,
        lit_int(1),
    ))
}

/// `SUBSTRING(s, start + 1[, length])`
///
/// The 2-argument form is used when no length was given.
pub(crate) fn substring(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 2, 3)?;
    let string = t.translate(&node.args[0])?;
    let start = one_based(t, &node.args[1])?;

    let mut args = vec![string, start];
    if let Some(length) = node.arg(2) {
        args.push(t.translate(length)?);
    }
    Ok(func("substring", args))
}

/// Shift a 0-based index to 1-based, folding integer literals.
fn one_based(t: &mut ExprTranslator<'_>, index: &ValueExpr) -> CompileResult<Expr> {
    if let ValueExpr::Literal {
        value: Value::Int(n),
        ty: None,
    } = index
    {
        if let Some(shifted) = n.checked_add(1) {
            return Ok(lit_int(shifted));
        }
    }
    let value = t.translate(index)?;
    Ok(Expr::binary(value.nested(), BinaryOperator::Plus, lit_int(1)))
}

/// `FLOOR(a / b)`
pub(crate) fn floor_divide(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 2, 2)?;
    let left = t.translate(&node.args[0])?;
    let right = t.translate(&node.args[1])?;
    Ok(func(
        "floor",
        vec![Expr::binary(left.nested(), BinaryOperator::Div, right.nested())],
    ))
}

/// `CAST(DATEPART(unit, x) AS SMALLINT)`
///
/// DATEPART rejects a parameterized unit, so the unit is emitted as a bare
/// keyword.
pub(crate) fn extract(t: &mut ExprTranslator<'_>, node: &OpNode) -> CompileResult<Expr> {
    check_arity(node, 1, 1)?;
    let unit = match node.kind {
        OpKind::ExtractYear => "year",
        OpKind::ExtractMonth => "month",
        OpKind::ExtractDay => "day",
        OpKind::ExtractHour => "hour",
        OpKind::ExtractMinute => "minute",
        OpKind::ExtractSecond => "second",
        OpKind::ExtractMillisecond => "millisecond",
        other => {
            return Err(CompileError::InvalidExpression(format!(
                "{} is not a field extraction",
                other
            )))
        }
    };
    let value = t.translate(&node.args[0])?;
    let part = func("datepart", vec![raw_sql(unit), value]);
    Ok(part.cast(t.native_type(&LogicalType::Int16)?))
}

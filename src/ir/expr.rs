//! Scalar expression tree.
//!
//! A `ValueExpr` is a leaf (literal, column, parameter) or an `OpNode`
//! applying an `OpKind` to ordered operands. Trees are built with the
//! fluent methods below and never mutated by the compiler.

use std::fmt;
use std::ops;

use super::ops::OpKind;
use super::types::LogicalType;
use super::value::Value;

// =============================================================================
// Table names
// =============================================================================

/// A table, optionally qualified by its database schema (`dbo.orders`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Split `schema.table`; a name without a dot is unqualified.
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self {
                schema: Some(schema.to_string()),
                name: name.to_string(),
            },
            None => Self::new(qualified),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

// =============================================================================
// Expression nodes
// =============================================================================

/// A scalar expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// Inline literal. `ty` overrides the value's natural type.
    Literal {
        value: Value,
        ty: Option<LogicalType>,
    },

    /// Column of a table. `ty` is `None` when the table schema has no such
    /// column; compiling such a reference fails.
    Column {
        table: TableName,
        name: String,
        ty: Option<LogicalType>,
    },

    /// Named scalar parameter, bound at compile time or later.
    Param { name: String, ty: LogicalType },

    /// Operation applied to operands.
    Op(OpNode),
}

/// An operation node.
#[derive(Debug, Clone, PartialEq)]
pub struct OpNode {
    pub kind: OpKind,
    pub args: Vec<ValueExpr>,
    /// Explicit result type (cast target, typed constructors).
    pub ty: Option<LogicalType>,
    /// Row filter for reductions.
    pub filter: Option<Box<ValueExpr>>,
}

impl OpNode {
    pub fn new(kind: OpKind, args: Vec<ValueExpr>) -> Self {
        Self {
            kind,
            args,
            ty: None,
            filter: None,
        }
    }

    pub fn with_type(mut self, ty: LogicalType) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Operand at `idx`, if present.
    pub fn arg(&self, idx: usize) -> Option<&ValueExpr> {
        self.args.get(idx)
    }
}

impl From<OpNode> for ValueExpr {
    fn from(node: OpNode) -> Self {
        ValueExpr::Op(node)
    }
}

// =============================================================================
// Leaf constructors
// =============================================================================

/// Untyped literal.
pub fn lit(value: impl Into<Value>) -> ValueExpr {
    ValueExpr::Literal {
        value: value.into(),
        ty: None,
    }
}

/// Literal with an explicit type annotation.
pub fn typed_lit(value: impl Into<Value>, ty: LogicalType) -> ValueExpr {
    ValueExpr::Literal {
        value: value.into(),
        ty: Some(ty),
    }
}

/// NULL literal.
pub fn null() -> ValueExpr {
    lit(Value::Null)
}

/// Named scalar parameter.
pub fn param(name: impl Into<String>, ty: LogicalType) -> ValueExpr {
    ValueExpr::Param {
        name: name.into(),
        ty,
    }
}

/// Current timestamp.
pub fn now() -> ValueExpr {
    ValueExpr::op(OpKind::TimestampNow, vec![])
}

/// First non-null operand.
pub fn coalesce(args: Vec<ValueExpr>) -> ValueExpr {
    ValueExpr::op(OpKind::Coalesce, args)
}

/// Smallest operand.
pub fn least(args: Vec<ValueExpr>) -> ValueExpr {
    ValueExpr::op(OpKind::Least, args)
}

/// Largest operand.
pub fn greatest(args: Vec<ValueExpr>) -> ValueExpr {
    ValueExpr::op(OpKind::Greatest, args)
}

impl From<Value> for ValueExpr {
    fn from(value: Value) -> Self {
        lit(value)
    }
}

impl From<i64> for ValueExpr {
    fn from(n: i64) -> Self {
        lit(n)
    }
}

impl From<i32> for ValueExpr {
    fn from(n: i32) -> Self {
        lit(n)
    }
}

impl From<f64> for ValueExpr {
    fn from(x: f64) -> Self {
        lit(x)
    }
}

impl From<bool> for ValueExpr {
    fn from(b: bool) -> Self {
        lit(b)
    }
}

impl From<&str> for ValueExpr {
    fn from(s: &str) -> Self {
        lit(s)
    }
}

impl From<String> for ValueExpr {
    fn from(s: String) -> Self {
        lit(s)
    }
}

impl From<chrono::NaiveDate> for ValueExpr {
    fn from(d: chrono::NaiveDate) -> Self {
        lit(d)
    }
}

impl From<chrono::NaiveDateTime> for ValueExpr {
    fn from(ts: chrono::NaiveDateTime) -> Self {
        lit(ts)
    }
}

// =============================================================================
// Fluent builders
// =============================================================================

impl ValueExpr {
    /// Apply `kind` to `args`.
    pub fn op(kind: OpKind, args: Vec<ValueExpr>) -> ValueExpr {
        ValueExpr::Op(OpNode::new(kind, args))
    }

    fn unary(self, kind: OpKind) -> ValueExpr {
        ValueExpr::op(kind, vec![self])
    }

    fn binary(self, kind: OpKind, other: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(kind, vec![self, other.into()])
    }

    // --- comparison ---

    pub fn eq(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Equals, other)
    }

    pub fn ne(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::NotEquals, other)
    }

    pub fn lt(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Less, other)
    }

    pub fn le(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::LessEqual, other)
    }

    pub fn gt(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Greater, other)
    }

    pub fn ge(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::GreaterEqual, other)
    }

    pub fn between(self, lo: impl Into<ValueExpr>, hi: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::Between, vec![self, lo.into(), hi.into()])
    }

    pub fn isin(self, values: Vec<ValueExpr>) -> ValueExpr {
        let mut args = vec![self];
        args.extend(values);
        ValueExpr::op(OpKind::IsIn, args)
    }

    pub fn notin(self, values: Vec<ValueExpr>) -> ValueExpr {
        let mut args = vec![self];
        args.extend(values);
        ValueExpr::op(OpKind::NotIn, args)
    }

    // --- logical ---

    pub fn and(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::And, other)
    }

    pub fn or(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Or, other)
    }

    // --- null handling ---

    pub fn is_null(self) -> ValueExpr {
        self.unary(OpKind::IsNull)
    }

    pub fn not_null(self) -> ValueExpr {
        self.unary(OpKind::NotNull)
    }

    pub fn if_null(self, fallback: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::IfNull, fallback)
    }

    pub fn nullif(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::NullIf, other)
    }

    // --- arithmetic ---

    pub fn floor_div(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::FloorDivide, other)
    }

    pub fn pow(self, exponent: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Power, exponent)
    }

    // --- math ---

    pub fn abs(self) -> ValueExpr {
        self.unary(OpKind::Abs)
    }

    pub fn acos(self) -> ValueExpr {
        self.unary(OpKind::Acos)
    }

    pub fn asin(self) -> ValueExpr {
        self.unary(OpKind::Asin)
    }

    pub fn atan(self) -> ValueExpr {
        self.unary(OpKind::Atan)
    }

    pub fn atan2(self, x: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Atan2, x)
    }

    pub fn ceil(self) -> ValueExpr {
        self.unary(OpKind::Ceil)
    }

    pub fn cos(self) -> ValueExpr {
        self.unary(OpKind::Cos)
    }

    pub fn floor(self) -> ValueExpr {
        self.unary(OpKind::Floor)
    }

    pub fn sign(self) -> ValueExpr {
        self.unary(OpKind::Sign)
    }

    pub fn sin(self) -> ValueExpr {
        self.unary(OpKind::Sin)
    }

    pub fn sqrt(self) -> ValueExpr {
        self.unary(OpKind::Sqrt)
    }

    pub fn tan(self) -> ValueExpr {
        self.unary(OpKind::Tan)
    }

    pub fn round(self) -> ValueExpr {
        self.unary(OpKind::Round)
    }

    pub fn log2(self) -> ValueExpr {
        self.unary(OpKind::Log2)
    }

    pub fn ln(self) -> ValueExpr {
        self.unary(OpKind::Ln)
    }

    pub fn log10(self) -> ValueExpr {
        self.unary(OpKind::Log10)
    }

    pub fn log(self, base: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Log, base)
    }

    pub fn exp(self) -> ValueExpr {
        self.unary(OpKind::Exp)
    }

    // --- string ---

    pub fn lower(self) -> ValueExpr {
        self.unary(OpKind::Lowercase)
    }

    pub fn upper(self) -> ValueExpr {
        self.unary(OpKind::Uppercase)
    }

    pub fn lstrip(self) -> ValueExpr {
        self.unary(OpKind::LStrip)
    }

    pub fn rstrip(self) -> ValueExpr {
        self.unary(OpKind::RStrip)
    }

    pub fn strip(self) -> ValueExpr {
        self.unary(OpKind::Strip)
    }

    pub fn repeat(self, times: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Repeat, times)
    }

    pub fn reverse(self) -> ValueExpr {
        self.unary(OpKind::Reverse)
    }

    /// 0-based position of `needle`, or -1.
    pub fn find(self, needle: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::StringFind, needle)
    }

    /// Like `find`, searching from `start`.
    pub fn find_from(self, needle: impl Into<ValueExpr>, start: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::StringFind, vec![self, needle.into(), start.into()])
    }

    pub fn length(self) -> ValueExpr {
        self.unary(OpKind::StringLength)
    }

    pub fn replace(self, pattern: impl Into<ValueExpr>, with: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::StringReplace, vec![self, pattern.into(), with.into()])
    }

    pub fn concat(self, other: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::StringConcat, other)
    }

    /// Suffix starting at 0-based `start`.
    pub fn substr(self, start: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Substring, start)
    }

    /// `len` characters starting at 0-based `start`.
    pub fn substr_len(self, start: impl Into<ValueExpr>, len: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::Substring, vec![self, start.into(), len.into()])
    }

    pub fn contains(self, needle: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::Contains, needle)
    }

    pub fn not_contains(self, needle: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::NotContains, needle)
    }

    pub fn lpad(self, len: impl Into<ValueExpr>, pad: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::LPad, vec![self, len.into(), pad.into()])
    }

    pub fn rpad(self, len: impl Into<ValueExpr>, pad: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::RPad, vec![self, len.into(), pad.into()])
    }

    pub fn capitalize(self) -> ValueExpr {
        self.unary(OpKind::Capitalize)
    }

    pub fn re_search(self, pattern: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::RegexSearch, pattern)
    }

    pub fn re_extract(self, pattern: impl Into<ValueExpr>, group: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::RegexExtract, vec![self, pattern.into(), group.into()])
    }

    pub fn re_replace(self, pattern: impl Into<ValueExpr>, with: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::RegexReplace, vec![self, pattern.into(), with.into()])
    }

    pub fn ascii(self) -> ValueExpr {
        self.unary(OpKind::StringAscii)
    }

    pub fn like(self, pattern: impl Into<ValueExpr>) -> ValueExpr {
        self.binary(OpKind::StringSqlLike, pattern)
    }

    // --- reductions ---

    pub fn count(self) -> ValueExpr {
        self.unary(OpKind::Count)
    }

    pub fn sum(self) -> ValueExpr {
        self.unary(OpKind::Sum)
    }

    pub fn min(self) -> ValueExpr {
        self.unary(OpKind::Min)
    }

    pub fn max(self) -> ValueExpr {
        self.unary(OpKind::Max)
    }

    pub fn mean(self) -> ValueExpr {
        self.unary(OpKind::Mean)
    }

    pub fn notany(self) -> ValueExpr {
        self.unary(OpKind::NotAny)
    }

    pub fn cumsum(self) -> ValueExpr {
        self.unary(OpKind::CumulativeSum)
    }

    pub fn cummin(self) -> ValueExpr {
        self.unary(OpKind::CumulativeMin)
    }

    pub fn cummax(self) -> ValueExpr {
        self.unary(OpKind::CumulativeMax)
    }

    pub fn cummean(self) -> ValueExpr {
        self.unary(OpKind::CumulativeMean)
    }

    /// Restrict a reduction to rows where `cond` holds.
    ///
    /// Non-reduction expressions are returned unchanged.
    pub fn filter(self, cond: impl Into<ValueExpr>) -> ValueExpr {
        match self {
            ValueExpr::Op(mut node) if node.kind.is_reduction() => {
                node.filter = Some(Box::new(cond.into()));
                ValueExpr::Op(node)
            }
            other => other,
        }
    }

    // --- temporal ---

    pub fn year(self) -> ValueExpr {
        self.unary(OpKind::ExtractYear)
    }

    pub fn month(self) -> ValueExpr {
        self.unary(OpKind::ExtractMonth)
    }

    pub fn day(self) -> ValueExpr {
        self.unary(OpKind::ExtractDay)
    }

    pub fn hour(self) -> ValueExpr {
        self.unary(OpKind::ExtractHour)
    }

    pub fn minute(self) -> ValueExpr {
        self.unary(OpKind::ExtractMinute)
    }

    pub fn second(self) -> ValueExpr {
        self.unary(OpKind::ExtractSecond)
    }

    pub fn millisecond(self) -> ValueExpr {
        self.unary(OpKind::ExtractMillisecond)
    }

    pub fn truncate(self, unit: &str) -> ValueExpr {
        self.binary(OpKind::TimestampTruncate, unit)
    }

    // --- conditional / misc ---

    /// `self ? then : otherwise`, with `self` as the condition.
    pub fn if_else(self, then: impl Into<ValueExpr>, otherwise: impl Into<ValueExpr>) -> ValueExpr {
        ValueExpr::op(OpKind::IfElse, vec![self, then.into(), otherwise.into()])
    }

    pub fn cast(self, ty: LogicalType) -> ValueExpr {
        ValueExpr::Op(OpNode::new(OpKind::Cast, vec![self]).with_type(ty))
    }

    pub fn hash(self) -> ValueExpr {
        self.unary(OpKind::Hash)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Logical type this expression evaluates to, when it can be inferred.
    pub fn output_type(&self) -> Option<LogicalType> {
        match self {
            ValueExpr::Literal { value, ty } => ty.clone().or_else(|| value.natural_type()),
            ValueExpr::Column { ty, .. } => ty.clone(),
            ValueExpr::Param { ty, .. } => Some(ty.clone()),
            ValueExpr::Op(node) => node.output_type(),
        }
    }

    /// Tables referenced by this expression, in first-seen order.
    pub fn tables(&self) -> Vec<TableName> {
        let mut out = Vec::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables(&self, out: &mut Vec<TableName>) {
        match self {
            ValueExpr::Column { table, .. } => {
                if !out.contains(table) {
                    out.push(table.clone());
                }
            }
            ValueExpr::Op(node) => {
                for arg in &node.args {
                    arg.collect_tables(out);
                }
                if let Some(filter) = &node.filter {
                    filter.collect_tables(out);
                }
            }
            ValueExpr::Literal { .. } | ValueExpr::Param { .. } => {}
        }
    }
}

impl OpNode {
    /// Inferred result type of this node.
    pub fn output_type(&self) -> Option<LogicalType> {
        if let Some(ty) = &self.ty {
            return Some(ty.clone());
        }
        if self.kind.is_predicate() {
            return Some(LogicalType::Boolean);
        }
        let first = || self.args.first().and_then(ValueExpr::output_type);
        match self.kind {
            OpKind::Count => Some(LogicalType::Int64),
            OpKind::Mean | OpKind::CumulativeMean | OpKind::Divide => Some(LogicalType::Float64),
            OpKind::Sqrt
            | OpKind::Acos
            | OpKind::Asin
            | OpKind::Atan
            | OpKind::Atan2
            | OpKind::Cos
            | OpKind::Sin
            | OpKind::Tan
            | OpKind::Ln
            | OpKind::Log
            | OpKind::Log2
            | OpKind::Log10
            | OpKind::Exp
            | OpKind::Power => Some(LogicalType::Float64),
            OpKind::FloorDivide => Some(LogicalType::Int64),
            OpKind::ExtractYear
            | OpKind::ExtractMonth
            | OpKind::ExtractDay
            | OpKind::ExtractHour
            | OpKind::ExtractMinute
            | OpKind::ExtractSecond
            | OpKind::ExtractMillisecond => Some(LogicalType::Int16),
            OpKind::StringFind | OpKind::StringLength | OpKind::StringAscii => {
                Some(LogicalType::Int32)
            }
            OpKind::Lowercase
            | OpKind::Uppercase
            | OpKind::LStrip
            | OpKind::RStrip
            | OpKind::Strip
            | OpKind::Repeat
            | OpKind::Reverse
            | OpKind::StringReplace
            | OpKind::StringConcat
            | OpKind::Substring
            | OpKind::LPad
            | OpKind::RPad
            | OpKind::Capitalize
            | OpKind::RegexExtract
            | OpKind::RegexReplace => Some(LogicalType::String),
            OpKind::TimestampNow => Some(LogicalType::Timestamp),
            OpKind::Hash => Some(LogicalType::Int64),
            OpKind::IfElse => self.args.get(1).and_then(ValueExpr::output_type),
            _ => first(),
        }
    }
}

// =============================================================================
// Operator overloads
// =============================================================================

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $kind:expr) => {
        impl<R: Into<ValueExpr>> ops::$trait<R> for ValueExpr {
            type Output = ValueExpr;

            fn $method(self, rhs: R) -> ValueExpr {
                ValueExpr::op($kind, vec![self, rhs.into()])
            }
        }
    };
}

impl_binary_op!(Add, add, OpKind::Add);
impl_binary_op!(Sub, sub, OpKind::Subtract);
impl_binary_op!(Mul, mul, OpKind::Multiply);
impl_binary_op!(Div, div, OpKind::Divide);
impl_binary_op!(Rem, rem, OpKind::Modulus);

impl ops::Neg for ValueExpr {
    type Output = ValueExpr;

    fn neg(self) -> ValueExpr {
        ValueExpr::op(OpKind::Negate, vec![self])
    }
}

impl ops::Not for ValueExpr {
    type Output = ValueExpr;

    fn not(self) -> ValueExpr {
        ValueExpr::op(OpKind::Not, vec![self])
    }
}

// =============================================================================
// Display (used in error messages)
// =============================================================================

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Literal { value, ty: None } => write!(f, "{}", value),
            ValueExpr::Literal {
                value,
                ty: Some(ty),
            } => write!(f, "{}:{}", value, ty),
            ValueExpr::Column { table, name, .. } => write!(f, "{}.{}", table, name),
            ValueExpr::Param { name, .. } => write!(f, "${}", name),
            ValueExpr::Op(node) => write!(f, "{}", node),
        }
    }
}

impl fmt::Display for OpNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " where {}", filter)?;
        }
        write!(f, ")")
    }
}

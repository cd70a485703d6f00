//! Operation registry: which translator handles each operation kind.
//!
//! The SQL Server table is built in one step from three immutable inputs:
//!
//! 1. `base_translator` - the generic translation of every `OpKind`, as an
//!    exhaustive match so a new kind cannot be added without a decision
//! 2. `MSSQL_OVERRIDES` - remaps and renames for SQL Server
//! 3. `MSSQL_UNSUPPORTED` - kinds SQL Server cannot express, bound to the
//!    rejecting translator up front so the table documents them
//!
//! The result never changes after construction.

use std::collections::BTreeMap;
use std::fmt;

use crate::ir::{LogicalType, OpKind, OpNode};
use crate::sql::expr::{BinaryOperator, Expr};

use super::error::{CompileResult, UnsupportedOperationError};
use super::translator::{self, ExprTranslator};

/// Custom translation function.
pub type TranslateFn = fn(&mut ExprTranslator<'_>, &OpNode) -> CompileResult<Expr>;

/// How an operation kind becomes native SQL.
#[derive(Clone)]
pub enum Translator {
    /// `f(x)`
    Unary(&'static str),
    /// `f(a, b, ...)` with exactly `arity` operands.
    FixedArity(&'static str, usize),
    /// `f(a, b, ...)` with one or more operands.
    Variadic(&'static str),
    /// `a op b`
    Binary(BinaryOperator),
    /// Aggregate with an optional row filter. Boolean operands are cast to
    /// `bool_cast` first when set.
    Reduction {
        func: &'static str,
        bool_cast: Option<LogicalType>,
    },
    /// Shape-specific translation.
    Custom(TranslateFn),
    /// Always fails with `UnsupportedOperationError`.
    Unsupported,
}

impl Translator {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Translator::Unsupported)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translator::Unary(name) => write!(f, "Unary({})", name),
            Translator::FixedArity(name, n) => write!(f, "FixedArity({}, {})", name, n),
            Translator::Variadic(name) => write!(f, "Variadic({})", name),
            Translator::Binary(op) => write!(f, "Binary({:?})", op),
            Translator::Reduction { func, bool_cast } => {
                write!(f, "Reduction({}, {:?})", func, bool_cast)
            }
            Translator::Custom(_) => write!(f, "Custom"),
            Translator::Unsupported => write!(f, "Unsupported"),
        }
    }
}

// =============================================================================
// Generic base
// =============================================================================

/// Generic translation of `kind`, before any dialect overrides.
///
/// `None` means there is no generic form: the kind must be rewritten away,
/// supplied by a dialect override, or it is unsupported.
pub fn base_translator(kind: OpKind) -> Option<Translator> {
    use BinaryOperator as B;
    use Translator::*;

    let t = match kind {
        OpKind::Equals => Binary(B::Eq),
        OpKind::NotEquals => Binary(B::Ne),
        OpKind::Less => Binary(B::Lt),
        OpKind::LessEqual => Binary(B::Lte),
        OpKind::Greater => Binary(B::Gt),
        OpKind::GreaterEqual => Binary(B::Gte),
        OpKind::Between => return None,
        OpKind::IsIn => Custom(translator::is_in),
        OpKind::NotIn => Custom(translator::is_in),

        OpKind::And => Custom(translator::logical),
        OpKind::Or => Custom(translator::logical),
        OpKind::Not => Custom(translator::not),

        OpKind::IsNull => Custom(translator::is_null),
        OpKind::NotNull => return None,
        OpKind::IfNull => return None,
        OpKind::NullIf => FixedArity("nullif", 2),
        OpKind::Coalesce => Variadic("coalesce"),

        OpKind::Add => Binary(B::Plus),
        OpKind::Subtract => Binary(B::Minus),
        OpKind::Multiply => Binary(B::Mul),
        OpKind::Divide => Binary(B::Div),
        OpKind::FloorDivide => return None,
        OpKind::Modulus => Binary(B::Mod),
        OpKind::Negate => Custom(translator::negate),
        OpKind::Power => FixedArity("power", 2),

        OpKind::Abs => Unary("abs"),
        OpKind::Acos => Unary("acos"),
        OpKind::Asin => Unary("asin"),
        OpKind::Atan => Unary("atan"),
        OpKind::Atan2 => FixedArity("atan2", 2),
        OpKind::Ceil => Unary("ceil"),
        OpKind::Cos => Unary("cos"),
        OpKind::Floor => Unary("floor"),
        OpKind::Sign => Unary("sign"),
        OpKind::Sin => Unary("sin"),
        OpKind::Sqrt => Unary("sqrt"),
        OpKind::Tan => Unary("tan"),
        OpKind::Round => Unary("round"),
        OpKind::Log2 => Unary("log2"),
        OpKind::Ln => Unary("ln"),
        OpKind::Log10 => Unary("log10"),
        OpKind::Log => FixedArity("log", 2),
        OpKind::Exp => Unary("exp"),

        OpKind::Lowercase => Unary("lower"),
        OpKind::Uppercase => Unary("upper"),
        OpKind::LStrip => Unary("ltrim"),
        OpKind::RStrip => Unary("rtrim"),
        OpKind::Strip => Unary("trim"),
        OpKind::Repeat => FixedArity("repeat", 2),
        OpKind::Reverse => Unary("reverse"),
        OpKind::StringFind => return None,
        OpKind::StringLength => Unary("length"),
        OpKind::StringReplace => FixedArity("replace", 3),
        OpKind::StringConcat => Binary(B::Concat),
        OpKind::Substring => return None,
        OpKind::Contains => return None,
        OpKind::NotContains => return None,
        OpKind::LPad => FixedArity("lpad", 3),
        OpKind::RPad => FixedArity("rpad", 3),
        OpKind::Capitalize => Unary("initcap"),
        OpKind::RegexSearch => return None,
        OpKind::RegexExtract => return None,
        OpKind::RegexReplace => return None,
        OpKind::StringAscii => Unary("ascii"),
        OpKind::StringSqlLike => Binary(B::Like),

        OpKind::Count => Reduction {
            func: "count",
            bool_cast: None,
        },
        OpKind::Sum => Reduction {
            func: "sum",
            bool_cast: None,
        },
        OpKind::Min => Reduction {
            func: "min",
            bool_cast: None,
        },
        OpKind::Max => Reduction {
            func: "max",
            bool_cast: None,
        },
        OpKind::Mean => Reduction {
            func: "avg",
            bool_cast: None,
        },
        OpKind::NotAny => return None,

        OpKind::CumulativeSum
        | OpKind::CumulativeMin
        | OpKind::CumulativeMax
        | OpKind::CumulativeMean => return None,

        OpKind::TimestampNow => FixedArity("current_timestamp", 0),
        OpKind::ExtractYear
        | OpKind::ExtractMonth
        | OpKind::ExtractDay
        | OpKind::ExtractHour
        | OpKind::ExtractMinute
        | OpKind::ExtractSecond
        | OpKind::ExtractMillisecond => return None,
        OpKind::TimestampTruncate => return None,

        OpKind::Least => Variadic("least"),
        OpKind::Greatest => Variadic("greatest"),
        OpKind::IfElse => Custom(translator::if_else),

        OpKind::Cast => Custom(translator::cast),
        OpKind::Hash => return None,
    };
    Some(t)
}

// =============================================================================
// SQL Server overrides
// =============================================================================

/// Remaps and renames for SQL Server.
pub static MSSQL_OVERRIDES: &[(OpKind, Translator)] = &[
    // SUM/AVG/... reject BIT operands
    (
        OpKind::Count,
        Translator::Reduction {
            func: "count",
            bool_cast: Some(LogicalType::Int32),
        },
    ),
    (
        OpKind::Max,
        Translator::Reduction {
            func: "max",
            bool_cast: Some(LogicalType::Int32),
        },
    ),
    (
        OpKind::Min,
        Translator::Reduction {
            func: "min",
            bool_cast: Some(LogicalType::Int32),
        },
    ),
    (
        OpKind::Sum,
        Translator::Reduction {
            func: "sum",
            bool_cast: Some(LogicalType::Int32),
        },
    ),
    // Integer AVG truncates
    (
        OpKind::Mean,
        Translator::Reduction {
            func: "avg",
            bool_cast: Some(LogicalType::Float64),
        },
    ),
    // string
    (OpKind::LStrip, Translator::Unary("ltrim")),
    (OpKind::Lowercase, Translator::Unary("lower")),
    (OpKind::RStrip, Translator::Unary("rtrim")),
    (OpKind::Repeat, Translator::FixedArity("replicate", 2)),
    (OpKind::Reverse, Translator::Unary("reverse")),
    (OpKind::StringFind, Translator::Custom(translator::string_find)),
    (OpKind::StringLength, Translator::Unary("len")),
    (OpKind::StringReplace, Translator::FixedArity("replace", 3)),
    (OpKind::Strip, Translator::Unary("trim")),
    (OpKind::Substring, Translator::Custom(translator::substring)),
    (OpKind::Uppercase, Translator::Unary("upper")),
    // math
    (OpKind::Abs, Translator::Unary("abs")),
    (OpKind::Acos, Translator::Unary("acos")),
    (OpKind::Asin, Translator::Unary("asin")),
    (OpKind::Atan2, Translator::FixedArity("atn2", 2)),
    (OpKind::Atan, Translator::Unary("atan")),
    (OpKind::Ceil, Translator::Unary("ceiling")),
    (OpKind::Cos, Translator::Unary("cos")),
    (OpKind::Floor, Translator::Unary("floor")),
    (OpKind::FloorDivide, Translator::Custom(translator::floor_divide)),
    (OpKind::Power, Translator::FixedArity("power", 2)),
    (OpKind::Sign, Translator::Unary("sign")),
    (OpKind::Sin, Translator::Unary("sin")),
    (OpKind::Sqrt, Translator::Unary("sqrt")),
    (OpKind::Tan, Translator::Unary("tan")),
    // temporal
    (OpKind::TimestampNow, Translator::FixedArity("getdate", 0)),
    (OpKind::ExtractYear, Translator::Custom(translator::extract)),
    (OpKind::ExtractMonth, Translator::Custom(translator::extract)),
    (OpKind::ExtractDay, Translator::Custom(translator::extract)),
    (OpKind::ExtractHour, Translator::Custom(translator::extract)),
    (OpKind::ExtractMinute, Translator::Custom(translator::extract)),
    (OpKind::ExtractSecond, Translator::Custom(translator::extract)),
    (OpKind::ExtractMillisecond, Translator::Custom(translator::extract)),
];

/// Kinds SQL Server cannot express.
pub static MSSQL_UNSUPPORTED: &[OpKind] = &[
    // standard operations
    OpKind::NotContains,
    OpKind::NullIf,
    OpKind::NotAny,
    // miscellaneous
    OpKind::Least,
    OpKind::Greatest,
    // numeric
    OpKind::Round,
    OpKind::Log2,
    OpKind::Ln,
    OpKind::Log10,
    OpKind::Log,
    OpKind::Exp,
    OpKind::Modulus,
    // string
    OpKind::Contains,
    OpKind::LPad,
    OpKind::RPad,
    OpKind::Capitalize,
    OpKind::RegexSearch,
    OpKind::RegexExtract,
    OpKind::RegexReplace,
    OpKind::StringAscii,
    OpKind::StringSqlLike,
    // cumulative aggregates
    OpKind::CumulativeMax,
    OpKind::CumulativeMin,
    OpKind::CumulativeMean,
    OpKind::CumulativeSum,
    // temporal
    OpKind::TimestampTruncate,
];

// =============================================================================
// Registry
// =============================================================================

/// Immutable mapping from operation kind to translator.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    entries: BTreeMap<OpKind, Translator>,
}

impl OperationRegistry {
    /// The generic base table with no dialect overrides.
    pub fn base() -> Self {
        let entries = OpKind::ALL
            .iter()
            .filter_map(|&kind| base_translator(kind).map(|t| (kind, t)))
            .collect();
        Self { entries }
    }

    /// Merge the base table with `overrides`, then bind every kind in
    /// `unsupported` to the rejecting translator.
    ///
    /// Later entries win, so an unsupported kind can never be revived by an
    /// override listed before it.
    pub fn build(overrides: &[(OpKind, Translator)], unsupported: &[OpKind]) -> Self {
        let mut entries = Self::base().entries;
        for (kind, translator) in overrides {
            entries.insert(*kind, translator.clone());
        }
        for kind in unsupported {
            entries.insert(*kind, Translator::Unsupported);
        }
        tracing::debug!(
            entries = entries.len(),
            overrides = overrides.len(),
            unsupported = unsupported.len(),
            "built operation registry"
        );
        Self { entries }
    }

    /// The SQL Server table.
    pub fn mssql() -> Self {
        Self::build(MSSQL_OVERRIDES, MSSQL_UNSUPPORTED)
    }

    /// Translator for `kind`, if the table has one.
    pub fn get(&self, kind: OpKind) -> Option<&Translator> {
        self.entries.get(&kind)
    }

    /// Translator for `node`, failing with `UnsupportedOperationError` when
    /// the table has no entry for its kind.
    pub fn lookup(&self, node: &OpNode) -> Result<&Translator, UnsupportedOperationError> {
        self.get(node.kind).ok_or_else(|| UnsupportedOperationError {
            op: node.kind,
            node: node.to_string(),
        })
    }

    /// Whether `kind` compiles (has an entry that is not the rejecting one).
    pub fn supports(&self, kind: OpKind) -> bool {
        self.get(kind).is_some_and(|t| !t.is_unsupported())
    }

    /// Kinds explicitly bound to the rejecting translator.
    pub fn unsupported(&self) -> Vec<OpKind> {
        self.entries
            .iter()
            .filter(|(_, t)| t.is_unsupported())
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

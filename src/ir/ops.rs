//! Operation kinds.
//!
//! `OpKind` is the closed set of operations an expression node can compute.
//! The compiler's registry is checked against it exhaustively, so adding a
//! variant here forces a decision about how every dialect translates it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The operation an `OpNode` computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    // Comparison
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Between,
    IsIn,
    NotIn,

    // Logical
    And,
    Or,
    Not,

    // Null handling
    IsNull,
    NotNull,
    IfNull,
    NullIf,
    Coalesce,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulus,
    Negate,
    Power,

    // Math
    Abs,
    Acos,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Cos,
    Floor,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Round,
    Log2,
    Ln,
    Log10,
    Log,
    Exp,

    // String
    Lowercase,
    Uppercase,
    LStrip,
    RStrip,
    Strip,
    Repeat,
    Reverse,
    StringFind,
    StringLength,
    StringReplace,
    StringConcat,
    Substring,
    Contains,
    NotContains,
    LPad,
    RPad,
    Capitalize,
    RegexSearch,
    RegexExtract,
    RegexReplace,
    StringAscii,
    StringSqlLike,

    // Reductions
    Count,
    Sum,
    Min,
    Max,
    Mean,
    NotAny,

    // Cumulative (windowed) reductions
    CumulativeSum,
    CumulativeMin,
    CumulativeMax,
    CumulativeMean,

    // Temporal
    TimestampNow,
    ExtractYear,
    ExtractMonth,
    ExtractDay,
    ExtractHour,
    ExtractMinute,
    ExtractSecond,
    ExtractMillisecond,
    TimestampTruncate,

    // Conditional
    Least,
    Greatest,
    IfElse,

    // Misc
    Cast,
    Hash,
}

impl OpKind {
    /// Every operation kind, in declaration order.
    pub const ALL: &'static [OpKind] = &[
        OpKind::Equals,
        OpKind::NotEquals,
        OpKind::Less,
        OpKind::LessEqual,
        OpKind::Greater,
        OpKind::GreaterEqual,
        OpKind::Between,
        OpKind::IsIn,
        OpKind::NotIn,
        OpKind::And,
        OpKind::Or,
        OpKind::Not,
        OpKind::IsNull,
        OpKind::NotNull,
        OpKind::IfNull,
        OpKind::NullIf,
        OpKind::Coalesce,
        OpKind::Add,
        OpKind::Subtract,
        OpKind::Multiply,
        OpKind::Divide,
        OpKind::FloorDivide,
        OpKind::Modulus,
        OpKind::Negate,
        OpKind::Power,
        OpKind::Abs,
        OpKind::Acos,
        OpKind::Asin,
        OpKind::Atan,
        OpKind::Atan2,
        OpKind::Ceil,
        OpKind::Cos,
        OpKind::Floor,
        OpKind::Sign,
        OpKind::Sin,
        OpKind::Sqrt,
        OpKind::Tan,
        OpKind::Round,
        OpKind::Log2,
        OpKind::Ln,
        OpKind::Log10,
        OpKind::Log,
        OpKind::Exp,
        OpKind::Lowercase,
        OpKind::Uppercase,
        OpKind::LStrip,
        OpKind::RStrip,
        OpKind::Strip,
        OpKind::Repeat,
        OpKind::Reverse,
        OpKind::StringFind,
        OpKind::StringLength,
        OpKind::StringReplace,
        OpKind::StringConcat,
        OpKind::Substring,
        OpKind::Contains,
        OpKind::NotContains,
        OpKind::LPad,
        OpKind::RPad,
        OpKind::Capitalize,
        OpKind::RegexSearch,
        OpKind::RegexExtract,
        OpKind::RegexReplace,
        OpKind::StringAscii,
        OpKind::StringSqlLike,
        OpKind::Count,
        OpKind::Sum,
        OpKind::Min,
        OpKind::Max,
        OpKind::Mean,
        OpKind::NotAny,
        OpKind::CumulativeSum,
        OpKind::CumulativeMin,
        OpKind::CumulativeMax,
        OpKind::CumulativeMean,
        OpKind::TimestampNow,
        OpKind::ExtractYear,
        OpKind::ExtractMonth,
        OpKind::ExtractDay,
        OpKind::ExtractHour,
        OpKind::ExtractMinute,
        OpKind::ExtractSecond,
        OpKind::ExtractMillisecond,
        OpKind::TimestampTruncate,
        OpKind::Least,
        OpKind::Greatest,
        OpKind::IfElse,
        OpKind::Cast,
        OpKind::Hash,
    ];

    /// Stable snake_case identifier, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Equals => "equals",
            OpKind::NotEquals => "not_equals",
            OpKind::Less => "less",
            OpKind::LessEqual => "less_equal",
            OpKind::Greater => "greater",
            OpKind::GreaterEqual => "greater_equal",
            OpKind::Between => "between",
            OpKind::IsIn => "is_in",
            OpKind::NotIn => "not_in",
            OpKind::And => "and",
            OpKind::Or => "or",
            OpKind::Not => "not",
            OpKind::IsNull => "is_null",
            OpKind::NotNull => "not_null",
            OpKind::IfNull => "if_null",
            OpKind::NullIf => "null_if",
            OpKind::Coalesce => "coalesce",
            OpKind::Add => "add",
            OpKind::Subtract => "subtract",
            OpKind::Multiply => "multiply",
            OpKind::Divide => "divide",
            OpKind::FloorDivide => "floor_divide",
            OpKind::Modulus => "modulus",
            OpKind::Negate => "negate",
            OpKind::Power => "power",
            OpKind::Abs => "abs",
            OpKind::Acos => "acos",
            OpKind::Asin => "asin",
            OpKind::Atan => "atan",
            OpKind::Atan2 => "atan2",
            OpKind::Ceil => "ceil",
            OpKind::Cos => "cos",
            OpKind::Floor => "floor",
            OpKind::Sign => "sign",
            OpKind::Sin => "sin",
            OpKind::Sqrt => "sqrt",
            OpKind::Tan => "tan",
            OpKind::Round => "round",
            OpKind::Log2 => "log2",
            OpKind::Ln => "ln",
            OpKind::Log10 => "log10",
            OpKind::Log => "log",
            OpKind::Exp => "exp",
            OpKind::Lowercase => "lowercase",
            OpKind::Uppercase => "uppercase",
            OpKind::LStrip => "lstrip",
            OpKind::RStrip => "rstrip",
            OpKind::Strip => "strip",
            OpKind::Repeat => "repeat",
            OpKind::Reverse => "reverse",
            OpKind::StringFind => "string_find",
            OpKind::StringLength => "string_length",
            OpKind::StringReplace => "string_replace",
            OpKind::StringConcat => "string_concat",
            OpKind::Substring => "substring",
            OpKind::Contains => "contains",
            OpKind::NotContains => "not_contains",
            OpKind::LPad => "lpad",
            OpKind::RPad => "rpad",
            OpKind::Capitalize => "capitalize",
            OpKind::RegexSearch => "regex_search",
            OpKind::RegexExtract => "regex_extract",
            OpKind::RegexReplace => "regex_replace",
            OpKind::StringAscii => "string_ascii",
            OpKind::StringSqlLike => "string_sql_like",
            OpKind::Count => "count",
            OpKind::Sum => "sum",
            OpKind::Min => "min",
            OpKind::Max => "max",
            OpKind::Mean => "mean",
            OpKind::NotAny => "not_any",
            OpKind::CumulativeSum => "cumulative_sum",
            OpKind::CumulativeMin => "cumulative_min",
            OpKind::CumulativeMax => "cumulative_max",
            OpKind::CumulativeMean => "cumulative_mean",
            OpKind::TimestampNow => "timestamp_now",
            OpKind::ExtractYear => "extract_year",
            OpKind::ExtractMonth => "extract_month",
            OpKind::ExtractDay => "extract_day",
            OpKind::ExtractHour => "extract_hour",
            OpKind::ExtractMinute => "extract_minute",
            OpKind::ExtractSecond => "extract_second",
            OpKind::ExtractMillisecond => "extract_millisecond",
            OpKind::TimestampTruncate => "timestamp_truncate",
            OpKind::Least => "least",
            OpKind::Greatest => "greatest",
            OpKind::IfElse => "if_else",
            OpKind::Cast => "cast",
            OpKind::Hash => "hash",
        }
    }

    /// Whether the operation yields a truth value rather than a scalar.
    ///
    /// SQL Server keeps the two apart: predicates can only appear in
    /// conditions, never as selected values.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            OpKind::Equals
                | OpKind::NotEquals
                | OpKind::Less
                | OpKind::LessEqual
                | OpKind::Greater
                | OpKind::GreaterEqual
                | OpKind::Between
                | OpKind::IsIn
                | OpKind::NotIn
                | OpKind::And
                | OpKind::Or
                | OpKind::Not
                | OpKind::IsNull
                | OpKind::NotNull
                | OpKind::Contains
                | OpKind::NotContains
                | OpKind::RegexSearch
                | OpKind::StringSqlLike
                | OpKind::NotAny
        )
    }

    /// Whether the operation aggregates many rows into one value.
    pub fn is_reduction(self) -> bool {
        matches!(
            self,
            OpKind::Count
                | OpKind::Sum
                | OpKind::Min
                | OpKind::Max
                | OpKind::Mean
                | OpKind::NotAny
        )
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

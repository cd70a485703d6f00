//! Logical types of the expression tree.
//!
//! These are backend-agnostic; `compiler::type_map` decides what each one
//! becomes in SQL Server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical type attached to values, columns and operation results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal { precision: u8, scale: u8 },
    String,
    Date,
    Time,
    Timestamp,
    Binary,
    Uuid,
    Json,
    Interval,
    Array(Box<LogicalType>),
}

impl LogicalType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            LogicalType::Int8 | LogicalType::Int16 | LogicalType::Int32 | LogicalType::Int64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                LogicalType::Float32 | LogicalType::Float64 | LogicalType::Decimal { .. }
            )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            LogicalType::Date | LogicalType::Time | LogicalType::Timestamp
        )
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => write!(f, "boolean"),
            LogicalType::Int8 => write!(f, "int8"),
            LogicalType::Int16 => write!(f, "int16"),
            LogicalType::Int32 => write!(f, "int32"),
            LogicalType::Int64 => write!(f, "int64"),
            LogicalType::Float32 => write!(f, "float32"),
            LogicalType::Float64 => write!(f, "float64"),
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal({}, {})", precision, scale)
            }
            LogicalType::String => write!(f, "string"),
            LogicalType::Date => write!(f, "date"),
            LogicalType::Time => write!(f, "time"),
            LogicalType::Timestamp => write!(f, "timestamp"),
            LogicalType::Binary => write!(f, "binary"),
            LogicalType::Uuid => write!(f, "uuid"),
            LogicalType::Json => write!(f, "json"),
            LogicalType::Interval => write!(f, "interval"),
            LogicalType::Array(inner) => write!(f, "array<{}>", inner),
        }
    }
}

//! Logical type to SQL Server native type mapping.
//!
//! SQL Server's `REAL` is single precision, and `float64` maps to it too.
//! That narrowing is kept for compatibility with existing consumers of this
//! mapping; `narrows_precision` reports it so callers can see where it bites.

use crate::ir::LogicalType;
use crate::sql::types::NativeType;

use super::error::UnsupportedTypeError;

/// Maps logical types to native column types and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper;

impl TypeMapper {
    /// Native type for `ty`.
    ///
    /// Fails for types SQL Server has no column type for; never guesses.
    pub fn map(&self, ty: &LogicalType) -> Result<NativeType, UnsupportedTypeError> {
        let native = match ty {
            LogicalType::Boolean => NativeType::Bit,
            LogicalType::Int8 => NativeType::TinyInt,
            LogicalType::Int16 => NativeType::SmallInt,
            LogicalType::Int32 => NativeType::Int,
            LogicalType::Int64 => NativeType::BigInt,
            LogicalType::Float32 | LogicalType::Float64 => NativeType::Real,
            LogicalType::Decimal { precision, scale } => NativeType::Decimal(*precision, *scale),
            LogicalType::String => NativeType::VarChar,
            LogicalType::Date => NativeType::Date,
            LogicalType::Time => NativeType::Time,
            LogicalType::Timestamp => NativeType::DateTime2,
            LogicalType::Binary => NativeType::VarBinary,
            LogicalType::Uuid => NativeType::UniqueIdentifier,
            LogicalType::Json | LogicalType::Interval | LogicalType::Array(_) => {
                return Err(UnsupportedTypeError(ty.clone()))
            }
        };
        Ok(native)
    }

    /// Whether mapping `ty` loses precision.
    pub fn narrows_precision(&self, ty: &LogicalType) -> bool {
        matches!(ty, LogicalType::Float64)
    }

    /// Logical type for a native type name reported by the catalog.
    ///
    /// Unknown names yield `None`; the caller decides how to surface them.
    pub fn from_native(
        &self,
        name: &str,
        precision: Option<u8>,
        scale: Option<u8>,
    ) -> Option<LogicalType> {
        let native = NativeType::parse(name)?.with_precision(precision, scale);
        let ty = match native {
            NativeType::Bit => LogicalType::Boolean,
            // TINYINT is unsigned 0..255, which only fits the wider type
            NativeType::TinyInt => LogicalType::Int16,
            NativeType::SmallInt => LogicalType::Int16,
            NativeType::Int => LogicalType::Int32,
            NativeType::BigInt => LogicalType::Int64,
            NativeType::Real => LogicalType::Float32,
            NativeType::Float => LogicalType::Float64,
            NativeType::Decimal(precision, scale) => LogicalType::Decimal { precision, scale },
            NativeType::Money => LogicalType::Decimal {
                precision: 19,
                scale: 4,
            },
            NativeType::VarChar
            | NativeType::NVarChar
            | NativeType::Char
            | NativeType::NChar
            | NativeType::Text => LogicalType::String,
            NativeType::Date => LogicalType::Date,
            NativeType::Time => LogicalType::Time,
            NativeType::DateTime
            | NativeType::DateTime2
            | NativeType::SmallDateTime
            | NativeType::DateTimeOffset => LogicalType::Timestamp,
            NativeType::VarBinary => LogicalType::Binary,
            NativeType::UniqueIdentifier => LogicalType::Uuid,
        };
        Some(ty)
    }
}

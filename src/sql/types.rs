//! Native SQL Server column types.
//!
//! This is distinct from the compiler's logical types: a `NativeType` is what
//! appears inside `CAST(.. AS <type>)` and what the catalog reports for a
//! column. The mapping between the two lives in `compiler::type_map`.

use std::fmt;

/// A SQL Server column type.
///
/// # Examples
///
/// ```ignore
/// use mssql_compiler::sql::types::NativeType;
///
/// assert_eq!(NativeType::Decimal(18, 2).to_string(), "DECIMAL(18, 2)");
/// assert_eq!(NativeType::parse("nvarchar"), Some(NativeType::NVarChar));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    /// 4-byte floating point.
    Real,
    /// 8-byte floating point (`FLOAT(53)`).
    Float,
    Decimal(u8, u8),
    Money,
    /// `VARCHAR(MAX)`
    VarChar,
    /// `NVARCHAR(MAX)`
    NVarChar,
    Char,
    NChar,
    Text,
    Date,
    Time,
    DateTime,
    DateTime2,
    SmallDateTime,
    DateTimeOffset,
    /// `VARBINARY(MAX)`
    VarBinary,
    UniqueIdentifier,
}

impl NativeType {
    /// Parse a type name as reported by `INFORMATION_SCHEMA.COLUMNS.DATA_TYPE`.
    ///
    /// Precision and scale are not part of the name; `decimal`/`numeric`
    /// parse with SQL Server's defaults `(18, 0)` and the caller overrides
    /// them with `with_precision`.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        // Length suffixes carry no type information here
        let base = match lower.find('(') {
            Some(idx) => lower[..idx].trim(),
            None => lower.as_str(),
        };

        let ty = match base {
            "bit" => NativeType::Bit,
            "tinyint" => NativeType::TinyInt,
            "smallint" => NativeType::SmallInt,
            "int" | "integer" => NativeType::Int,
            "bigint" => NativeType::BigInt,
            "real" => NativeType::Real,
            "float" | "double precision" => NativeType::Float,
            "decimal" | "numeric" => NativeType::Decimal(18, 0),
            "money" | "smallmoney" => NativeType::Money,
            "varchar" => NativeType::VarChar,
            "nvarchar" => NativeType::NVarChar,
            "char" => NativeType::Char,
            "nchar" => NativeType::NChar,
            "text" | "ntext" => NativeType::Text,
            "date" => NativeType::Date,
            "time" => NativeType::Time,
            "datetime" => NativeType::DateTime,
            "datetime2" => NativeType::DateTime2,
            "smalldatetime" => NativeType::SmallDateTime,
            "datetimeoffset" => NativeType::DateTimeOffset,
            "varbinary" | "binary" | "image" => NativeType::VarBinary,
            "uniqueidentifier" => NativeType::UniqueIdentifier,
            _ => return None,
        };
        Some(ty)
    }

    /// Apply catalog precision/scale to a decimal type. Other types are unchanged.
    pub fn with_precision(self, precision: Option<u8>, scale: Option<u8>) -> Self {
        match self {
            NativeType::Decimal(p, s) => {
                NativeType::Decimal(precision.unwrap_or(p), scale.unwrap_or(s))
            }
            other => other,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Bit => write!(f, "BIT"),
            NativeType::TinyInt => write!(f, "TINYINT"),
            NativeType::SmallInt => write!(f, "SMALLINT"),
            NativeType::Int => write!(f, "INT"),
            NativeType::BigInt => write!(f, "BIGINT"),
            NativeType::Real => write!(f, "REAL"),
            NativeType::Float => write!(f, "FLOAT"),
            NativeType::Decimal(p, s) => write!(f, "DECIMAL({}, {})", p, s),
            NativeType::Money => write!(f, "MONEY"),
            NativeType::VarChar => write!(f, "VARCHAR(MAX)"),
            NativeType::NVarChar => write!(f, "NVARCHAR(MAX)"),
            NativeType::Char => write!(f, "CHAR"),
            NativeType::NChar => write!(f, "NCHAR"),
            NativeType::Text => write!(f, "TEXT"),
            NativeType::Date => write!(f, "DATE"),
            NativeType::Time => write!(f, "TIME"),
            NativeType::DateTime => write!(f, "DATETIME"),
            NativeType::DateTime2 => write!(f, "DATETIME2"),
            NativeType::SmallDateTime => write!(f, "SMALLDATETIME"),
            NativeType::DateTimeOffset => write!(f, "DATETIMEOFFSET"),
            NativeType::VarBinary => write!(f, "VARBINARY(MAX)"),
            NativeType::UniqueIdentifier => write!(f, "UNIQUEIDENTIFIER"),
        }
    }
}

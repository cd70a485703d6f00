//! Logical ↔ native type mapping, directly and through CAST.

#[path = "../common/mod.rs"]
mod common;

use mssql_compiler::compiler::{compile, CompileError, Params, TypeMapper, UnsupportedTypeError};
use mssql_compiler::ir::LogicalType;
use mssql_compiler::sql::NativeType;

use common::{alltypes, assert_parses};

fn mappable() -> Vec<LogicalType> {
    vec![
        LogicalType::Boolean,
        LogicalType::Int8,
        LogicalType::Int16,
        LogicalType::Int32,
        LogicalType::Int64,
        LogicalType::Float32,
        LogicalType::Float64,
        LogicalType::Decimal {
            precision: 10,
            scale: 2,
        },
        LogicalType::String,
        LogicalType::Date,
        LogicalType::Time,
        LogicalType::Timestamp,
        LogicalType::Binary,
        LogicalType::Uuid,
    ]
}

#[test]
fn test_native_names() {
    let mapper = TypeMapper;
    let rendered: Vec<String> = mappable()
        .iter()
        .map(|ty| mapper.map(ty).unwrap().to_string())
        .collect();
    assert_eq!(
        rendered,
        vec![
            "BIT",
            "TINYINT",
            "SMALLINT",
            "INT",
            "BIGINT",
            "REAL",
            "REAL",
            "DECIMAL(10, 2)",
            "VARCHAR(MAX)",
            "DATE",
            "TIME",
            "DATETIME2",
            "VARBINARY(MAX)",
            "UNIQUEIDENTIFIER",
        ]
    );
}

#[test]
fn test_round_trip_except_known_widenings() {
    let mapper = TypeMapper;
    for ty in mappable() {
        let native = mapper.map(&ty).unwrap();
        let (precision, scale) = match native {
            NativeType::Decimal(p, s) => (Some(p), Some(s)),
            _ => (None, None),
        };
        let back = mapper
            .from_native(&native.to_string(), precision, scale)
            .unwrap();

        let expected = match ty {
            // REAL reads back as single precision
            LogicalType::Float64 => LogicalType::Float32,
            // TINYINT is unsigned
            LogicalType::Int8 => LogicalType::Int16,
            other => other,
        };
        assert_eq!(back, expected, "round trip of {}", native);
    }
}

#[test]
fn test_unsupported_types_fail() {
    let mapper = TypeMapper;
    for ty in [
        LogicalType::Json,
        LogicalType::Interval,
        LogicalType::Array(Box::new(LogicalType::Int32)),
    ] {
        assert_eq!(mapper.map(&ty), Err(UnsupportedTypeError(ty.clone())));
    }
}

#[test]
fn test_catalog_names() {
    let mapper = TypeMapper;
    assert_eq!(mapper.from_native("nvarchar", None, None), Some(LogicalType::String));
    assert_eq!(mapper.from_native("DATETIMEOFFSET", None, None), Some(LogicalType::Timestamp));
    assert_eq!(mapper.from_native("bit", None, None), Some(LogicalType::Boolean));
    assert_eq!(mapper.from_native("float", None, None), Some(LogicalType::Float64));
    assert_eq!(mapper.from_native("geography", None, None), None);
}

#[test]
fn test_cast_uses_native_type() {
    let t = alltypes();
    let compiled = compile(
        t.col("int_col").cast(LogicalType::Float64),
        &Params::new(),
    )
    .unwrap();
    let sql = compiled.to_sql();
    assert_eq!(
        sql,
        "SELECT\n  CAST([t0].[int_col] AS REAL) AS [tmp]\nFROM [functional_alltypes] AS [t0]"
    );
    assert_parses(&sql);

    let compiled = compile(
        t.col("double_col").cast(LogicalType::Decimal {
            precision: 12,
            scale: 4,
        }),
        &Params::new(),
    )
    .unwrap();
    assert!(compiled
        .to_sql()
        .contains("CAST([t0].[double_col] AS DECIMAL(12, 4))"));
}

#[test]
fn test_cast_to_unmapped_type_fails() {
    let t = alltypes();
    let err = compile(t.col("string_col").cast(LogicalType::Json), &Params::new()).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnsupportedType(UnsupportedTypeError(LogicalType::Json))
    );
    assert_eq!(err.to_string(), "SQL Server backend has no native type for json");
}

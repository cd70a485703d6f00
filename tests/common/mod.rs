//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use mssql_compiler::ir::{LogicalType, TableExpr};
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;

/// Panics unless `sql` parses as T-SQL.
pub fn assert_parses(sql: &str) {
    if let Err(e) = Parser::parse_sql(&MsSqlDialect {}, sql) {
        panic!("Invalid T-SQL: {}\nSQL: {}", e, sql);
    }
}

/// The standard mixed-type test table.
pub fn alltypes() -> TableExpr {
    TableExpr::new(
        "functional_alltypes",
        vec![
            ("id", LogicalType::Int32),
            ("bool_col", LogicalType::Boolean),
            ("tinyint_col", LogicalType::Int8),
            ("smallint_col", LogicalType::Int16),
            ("int_col", LogicalType::Int32),
            ("bigint_col", LogicalType::Int64),
            ("float_col", LogicalType::Float32),
            ("double_col", LogicalType::Float64),
            ("date_string_col", LogicalType::String),
            ("string_col", LogicalType::String),
            ("timestamp_col", LogicalType::Timestamp),
            ("year", LogicalType::Int32),
            ("month", LogicalType::Int32),
        ],
    )
}

pub fn orders() -> TableExpr {
    TableExpr::new(
        "orders",
        vec![
            ("id", LogicalType::Int64),
            ("customer_id", LogicalType::Int64),
            (
                "amount",
                LogicalType::Decimal {
                    precision: 18,
                    scale: 2,
                },
            ),
            ("placed_at", LogicalType::Timestamp),
        ],
    )
    .with_schema("sales")
}

pub fn customers() -> TableExpr {
    TableExpr::new(
        "customers",
        vec![("id", LogicalType::Int64), ("name", LogicalType::String)],
    )
}

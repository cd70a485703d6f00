//! Test utilities for SQL emission validation.
//!
//! Validates emitted T-SQL by parsing it back with sqlparser-rs.

use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string parses as T-SQL.
///
/// ```ignore
/// use crate::sql::test_utils::validate_sql;
///
/// validate_sql("SELECT [t0].* FROM [users] AS [t0]").unwrap();
/// ```
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&MsSqlDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid T-SQL: {}\nSQL: {}", e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT [t0].* FROM [users] AS [t0]").unwrap();
        validate_sql("SELECT TOP 10 * FROM users").unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        assert!(validate_sql("SELEC * FORM users").is_err());
    }
}

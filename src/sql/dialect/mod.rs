//! SQL Dialect definitions and formatting rules.
//!
//! The compiler targets one engine, but rendering rules still go through the
//! `SqlDialect` trait so token serialization never hard-codes quoting,
//! literal or pagination syntax:
//!
//! - Identifier quoting: `[name]`
//! - Pagination: `OFFSET m ROWS FETCH NEXT n ROWS ONLY` (requires ORDER BY)
//! - Boolean literals: `1`/`0`
//! - String concatenation: `+`
//! - Parameters: `@name`
//!
//! # Usage
//!
//! ```ignore
//! use mssql_compiler::sql::dialect::{SqlDialect, TSql};
//!
//! let quoted = TSql.quote_identifier("user");  // [user]
//! ```

pub mod helpers;
mod tsql;

pub use tsql::TSql;

use super::token::{Token, TokenStream};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    /// Format a float literal.
    fn format_float(&self, f: f64) -> String {
        helpers::format_float(f)
    }

    /// Format a date literal (`YYYY-MM-DD`).
    fn format_date_literal(&self, date: &str) -> String {
        format!("DATE '{}'", date)
    }

    /// Format a named query parameter placeholder.
    fn format_param(&self, name: &str) -> String {
        format!(":{}", name)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        let mut ts = TokenStream::new();
        if let Some(lim) = limit {
            ts.push(Token::Raw("LIMIT".into()))
                .space()
                .push(Token::LitInt(lim as i64));
        }
        if let Some(off) = offset {
            if limit.is_some() {
                ts.space();
            }
            ts.push(Token::Offset)
                .space()
                .push(Token::LitInt(off as i64));
        }
        ts
    }

    /// Whether this dialect requires ORDER BY for OFFSET/LIMIT.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Operators and values
    // =========================================================================

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Whether predicates can appear where a value is expected
    /// (e.g. `SELECT a > 1`).
    fn supports_boolean_values(&self) -> bool {
        true
    }

    /// Whether this dialect supports NULLS FIRST/LAST in ORDER BY.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }
}

//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! Rendering differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - No boolean values outside predicates (bit `1`/`0` instead)
//! - OFFSET FETCH for pagination (requires ORDER BY)
//! - N'...' prefix for Unicode strings
//! - `@name` parameters
//! - String concatenation with `+`

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_date_literal(&self, date: &str) -> String {
        // No DATE 'YYYY-MM-DD' syntax; the string converts implicitly
        format!("'{}'", date)
    }

    fn format_param(&self, name: &str) -> String {
        format!("@{}", name)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn concat_operator(&self) -> &'static str {
        "+"
    }

    fn supports_boolean_values(&self) -> bool {
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        // NULLS FIRST/LAST only exists from SQL Server 2022
        false
    }
}

//! Native SQL layer.
//!
//! A type-safe T-SQL builder that the compiler lowers into:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`types`] - Native SQL Server column types
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - Rendering rules

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{SqlDialect, TSql};
pub use expr::{
    col, func, lit_int, lit_null, lit_str, table_col, table_star, BinaryOperator, Expr, ExprExt,
    Literal, UnaryOperator,
};
pub use query::{Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Token, TokenStream};
pub use types::NativeType;

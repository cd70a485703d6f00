//! # mssql-compiler
//!
//! Compiles backend-agnostic relational expression trees to SQL Server T-SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        ir (ValueExpr, Relation, LogicalType)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler: rules, registry, type map]
//! ┌─────────────────────────────────────────────────────────┐
//! │              sql::Query (T-SQL AST)                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::dialect::TSql]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    T-SQL text                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [client → worker process]
//!                     SQL Server
//! ```
//!
//! Compilation is pure and synchronous. Only the [`client`] does I/O, through
//! a worker process that owns the native driver.

pub mod client;
pub mod compiler;
pub mod config;
pub mod ir;
pub mod sql;
pub mod worker;

pub use client::{connect, connect_named, ClientError, ClientResult, MsSqlClient, QueryResult, RowLimit};
pub use compiler::{
    compile, CompileError, CompileResult, CompiledQuery, Expression, MsSqlDialect, Params,
    UnsupportedOperationError, UnsupportedTypeError,
};
pub use config::ConnectOptions;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::client::{connect, connect_named, MsSqlClient, RowLimit};
    pub use crate::compiler::{compile, CompileError, CompiledQuery, MsSqlDialect, Params};
    pub use crate::config::ConnectOptions;
    pub use crate::ir::{
        coalesce, greatest, least, lit, now, null, param, typed_lit, JoinKind, LogicalType,
        Named, OpKind, Relation, SortKey, TableExpr, TableName, Value, ValueExpr,
    };
}

//! Backend-agnostic expression tree.
//!
//! This is what callers build and what the compiler consumes:
//!
//! - [`types`] - logical types
//! - [`value`] - literal values
//! - [`ops`] - the closed set of operation kinds
//! - [`expr`] - scalar expressions (`ValueExpr`, `OpNode`)
//! - [`relation`] - table expressions (`TableExpr`, `Relation`)
//!
//! # Example
//!
//! ```ignore
//! use mssql_compiler::ir::*;
//!
//! let t = TableExpr::new("functional_alltypes", vec![
//!     ("double_col", LogicalType::Float64),
//!     ("string_col", LogicalType::String),
//! ]);
//! let expr = t.col("double_col") + 1;
//! let rel = t.relation()
//!     .filter(vec![t.col("string_col").eq("a")])
//!     .limit(10, 0);
//! ```

pub mod expr;
pub mod ops;
pub mod relation;
pub mod types;
pub mod value;

pub use expr::{coalesce, greatest, least, lit, now, null, param, typed_lit, OpNode, TableName, ValueExpr};
pub use ops::OpKind;
pub use relation::{
    Aggregation, GroupedRelation, Join, JoinKind, Limit, Named, Relation, Selection, SortKey,
    TableExpr,
};
pub use types::LogicalType;
pub use value::Value;

//! The SQL Server expression compiler.
//!
//! ```text
//! ValueExpr / Relation
//!         │
//!         ▼ [rules]        between, not_null, if_null rewritten away
//!   normalized tree
//!         │
//!         ▼ [translator]   registry dispatch per OpKind, type map for casts
//!     sql::Query
//!         │
//!         ▼ [CompiledQuery] parameter table, rendering
//!       T-SQL
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mssql_compiler::compiler::{compile, Params};
//! use mssql_compiler::ir::*;
//!
//! let t = TableExpr::new("functional_alltypes", vec![("double_col", LogicalType::Float64)]);
//! let compiled = compile(t.col("double_col") + 1, &Params::new())?;
//! assert_eq!(
//!     compiled.to_sql(),
//!     "SELECT\n  [t0].[double_col] + 1 AS [tmp]\nFROM [functional_alltypes] AS [t0]"
//! );
//! ```

mod context;
mod dialect;
mod error;
mod registry;
mod relation;
mod rules;
mod translator;
mod type_map;

use std::collections::BTreeMap;
use std::fmt;

use crate::ir::{Named, Relation, TableExpr, Value, ValueExpr};
use crate::sql::dialect::TSql;
use crate::sql::query::Query;

pub use context::{check_param_name, CompileContext, Params};
pub use dialect::MsSqlDialect;
pub use error::{CompileError, CompileResult, UnsupportedOperationError, UnsupportedTypeError};
pub use registry::{
    base_translator, OperationRegistry, TranslateFn, Translator, MSSQL_OVERRIDES,
    MSSQL_UNSUPPORTED,
};
pub use relation::SCALAR_ALIAS;
pub use rules::{RewriteFn, RewriteRules};
pub use translator::ExprTranslator;
pub use type_map::TypeMapper;

/// Compile `expr` for SQL Server with `params` bound.
pub fn compile(expr: impl Into<Expression>, params: &Params) -> CompileResult<CompiledQuery> {
    MsSqlDialect::get().compile(expr, params)
}

// =============================================================================
// Compiler input
// =============================================================================

/// Anything the compiler accepts as a root.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A scalar, selected under `name` (or `tmp`).
    Scalar {
        expr: ValueExpr,
        name: Option<String>,
    },
    Relation(Relation),
}

impl Expression {
    /// Apply rewrite rules to every embedded expression.
    pub fn rewrite(self, rules: &RewriteRules) -> Expression {
        match self {
            Expression::Scalar { expr, name } => Expression::Scalar {
                expr: rules.apply(expr),
                name,
            },
            Expression::Relation(rel) => Expression::Relation(rules.apply_relation(rel)),
        }
    }
}

impl From<ValueExpr> for Expression {
    fn from(expr: ValueExpr) -> Self {
        Expression::Scalar { expr, name: None }
    }
}

impl From<Named<ValueExpr>> for Expression {
    fn from(named: Named<ValueExpr>) -> Self {
        Expression::Scalar {
            expr: named.expr,
            name: Some(named.name),
        }
    }
}

impl From<Relation> for Expression {
    fn from(rel: Relation) -> Self {
        Expression::Relation(rel)
    }
}

impl From<TableExpr> for Expression {
    fn from(table: TableExpr) -> Self {
        Expression::Relation(Relation::Table(table))
    }
}

impl From<&TableExpr> for Expression {
    fn from(table: &TableExpr) -> Self {
        Expression::Relation(Relation::Table(table.clone()))
    }
}

// =============================================================================
// Compiler output
// =============================================================================

/// A compiled statement: the native query plus its parameter table.
///
/// The query stays structured until rendered, so callers can still adjust
/// limits or bind parameters before execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    query: Query,
    params: BTreeMap<String, Option<Value>>,
}

impl CompiledQuery {
    pub(crate) fn new(query: Query, params: BTreeMap<String, Option<Value>>) -> Self {
        Self { query, params }
    }

    /// The native query AST.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Referenced parameters; `None` marks a parameter still unbound.
    pub fn params(&self) -> &BTreeMap<String, Option<Value>> {
        &self.params
    }

    /// Render as T-SQL.
    pub fn to_sql(&self) -> String {
        self.query.to_sql(&TSql)
    }

    /// Bind a value to a parameter the query references.
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> CompileResult<()> {
        context::check_param_name(name)?;
        match self.params.get_mut(name) {
            Some(slot) => {
                *slot = Some(value.into());
                Ok(())
            }
            None => Err(CompileError::UnknownParameter(name.to_string())),
        }
    }

    /// Names of parameters without a value, in name order.
    pub fn unbound_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Cap the number of returned rows at `n`, keeping any smaller limit
    /// already present.
    pub fn with_limit(mut self, n: u64) -> Self {
        let lo = self.query.limit_offset.get_or_insert_with(Default::default);
        lo.limit = Some(lo.limit.map_or(n, |existing| existing.min(n)));
        self
    }

    /// Parameter values for the driver, in name order.
    ///
    /// Fails if any parameter is still unbound.
    pub fn positional_args(&self) -> CompileResult<Vec<(String, Value)>> {
        self.params
            .iter()
            .map(|(name, value)| match value {
                Some(v) => Ok((name.clone(), v.clone())),
                None => Err(CompileError::UnboundParameter(name.clone())),
            })
            .collect()
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

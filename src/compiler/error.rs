//! Compiler error types.

use thiserror::Error;

use crate::ir::{LogicalType, OpKind};

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// The expression tree contains an operation SQL Server cannot express.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("SQL Server backend doesn't support the {op} operation: {node}")]
pub struct UnsupportedOperationError {
    /// The offending operation kind.
    pub op: OpKind,
    /// Rendering of the node that carried it.
    pub node: String,
}

/// A logical type has no native SQL Server representation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("SQL Server backend has no native type for {0}")]
pub struct UnsupportedTypeError(pub LogicalType);

/// Errors raised while compiling an expression.
///
/// None of these are retriable: compilation is pure, so the same input
/// fails the same way every time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    UnsupportedOperation(#[from] UnsupportedOperationError),

    #[error(transparent)]
    UnsupportedType(#[from] UnsupportedTypeError),

    /// An operation node has the wrong number of operands.
    #[error("{op} expects {expected} argument(s), got {found}")]
    InvalidArity {
        op: OpKind,
        expected: String,
        found: usize,
    },

    /// A column references a table not present in the FROM clause.
    #[error("table '{0}' is not part of this query")]
    UnknownTable(String),

    /// A column is missing from its table's schema.
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// The tree has a shape no single statement can express.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// A parameter has no value at execution time.
    #[error("parameter '{0}' is not bound")]
    UnboundParameter(String),

    /// Binding a name the query never references.
    #[error("query has no parameter named '{0}'")]
    UnknownParameter(String),
}

impl CompileError {
    /// The operation kind this error names, if any.
    pub fn op_kind(&self) -> Option<OpKind> {
        match self {
            CompileError::UnsupportedOperation(e) => Some(e.op),
            CompileError::InvalidArity { op, .. } => Some(*op),
            _ => None,
        }
    }
}

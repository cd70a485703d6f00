//! Protocol types for worker communication.
//!
//! Every message is one JSON object per line. Requests carry a unique id;
//! the worker answers each with an envelope holding the same id.

use serde::{Deserialize, Serialize};

use crate::ir::Value;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "metadata.list_tables").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Database connection parameters, included in every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Driver name; always "mssql" for this crate.
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

/// Parameters for `metadata.list_tables`.
#[derive(Debug, Clone, Serialize)]
pub struct ListTablesParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    /// Schema to list tables from (optional, uses default if empty).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// Parameters for `metadata.get_columns`.
#[derive(Debug, Clone, Serialize)]
pub struct GetColumnsParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub schema: String,
    pub table: String,
}

/// A bound query parameter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryArg {
    /// Parameter name without the `@` prefix.
    pub name: String,
    pub value: Value,
}

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    /// T-SQL text.
    pub sql: String,
    /// Named arguments, referenced in the SQL as `@name`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<QueryArg>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Basic table information.
#[derive(Debug, Clone, Deserialize)]
pub struct TableInfo {
    /// Schema the table belongs to.
    pub schema: String,
    /// Table name.
    pub name: String,
    /// Table type ("TABLE", "VIEW").
    #[serde(rename = "type")]
    pub table_type: String,
}

/// Response from `metadata.list_tables`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTablesResponse {
    pub tables: Vec<TableInfo>,
}

/// Column information.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Ordinal position (1-based).
    pub position: i32,
    /// SQL Server type name, e.g. `nvarchar` or `decimal`.
    pub data_type: String,
    /// Whether NULL values are allowed.
    pub is_nullable: bool,
    #[serde(default)]
    pub numeric_precision: Option<i32>,
    #[serde(default)]
    pub numeric_scale: Option<i32>,
}

/// Response from `metadata.get_columns`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetColumnsResponse {
    pub columns: Vec<ColumnInfo>,
}

/// Column information in query results.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// SQL Server type name.
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    /// Result column descriptions.
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    pub row_count: i32,
}

// ============================================================================
// Method Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const LIST_TABLES: &str = "metadata.list_tables";
    pub const GET_COLUMNS: &str = "metadata.get_columns";
    pub const EXECUTE_QUERY: &str = "query.execute";
}

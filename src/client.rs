//! A SQL Server client bound to the compiler.
//!
//! The client never touches the wire protocol itself. Introspection and
//! execution go through the worker process; compilation goes through the
//! shared [`MsSqlDialect`].

use regex::Regex;

use crate::compiler::{CompileError, CompiledQuery, Expression, MsSqlDialect, Params};
use crate::config::{ConnectOptions, ConnectionError, Settings, SettingsError};
use crate::ir::{LogicalType, TableExpr, TableName};
use crate::worker::protocol::{ColumnInfo, ConnectionParams, QueryArg};
use crate::worker::{WorkerClient, WorkerError};

/// Schema used when a table name carries none.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`MsSqlClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid table pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("column {column} has unmapped type {data_type}")]
    UnmappedType { column: String, data_type: String },
}

/// How many rows `execute` may return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowLimit {
    /// The configured `compiler.default_limit`.
    #[default]
    Default,
    Unlimited,
    Rows(u64),
}

impl RowLimit {
    /// The row cap to apply, if any.
    pub fn resolve(self, default_limit: u64) -> Option<u64> {
        match self {
            RowLimit::Default => Some(default_limit),
            RowLimit::Unlimited => None,
            RowLimit::Rows(n) => Some(n),
        }
    }
}

/// Rows returned by `execute`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Open a client with settings loaded from the usual locations.
pub async fn connect(options: ConnectOptions) -> ClientResult<MsSqlClient> {
    let settings = Settings::load()?;
    MsSqlClient::connect_with_settings(options, settings).await
}

/// Open a client for a `[connections.<name>]` entry of the settings file,
/// or its default connection when `name` is `None`.
pub async fn connect_named(name: Option<&str>) -> ClientResult<MsSqlClient> {
    let settings = Settings::load()?;
    MsSqlClient::connect_named_with_settings(name, settings).await
}

/// A live SQL Server connection paired with the dialect compiler.
pub struct MsSqlClient {
    worker: WorkerClient,
    options: ConnectOptions,
    settings: Settings,
    dialect: &'static MsSqlDialect,
}

impl MsSqlClient {
    pub async fn connect_with_settings(
        options: ConnectOptions,
        settings: Settings,
    ) -> ClientResult<Self> {
        options.validate()?;
        let worker = WorkerClient::spawn_with_settings(&settings).await?;
        tracing::debug!(
            host = %options.host,
            database = %options.database,
            trusted = options.trusted_connection(),
            "connected"
        );
        Ok(Self {
            worker,
            options,
            settings,
            dialect: MsSqlDialect::get(),
        })
    }

    /// Connect using a named connection from `settings`.
    pub async fn connect_named_with_settings(
        name: Option<&str>,
        settings: Settings,
    ) -> ClientResult<Self> {
        let options = settings.connection_options(name)?;
        Self::connect_with_settings(options, settings).await
    }

    pub fn dialect(&self) -> &'static MsSqlDialect {
        self.dialect
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn connection(&self) -> ConnectionParams {
        ConnectionParams {
            driver: self.options.driver_name().to_string(),
            connection_string: self.options.to_connection_string(),
        }
    }

    /// Table names in the current database, sorted, optionally filtered by a
    /// regular expression.
    pub async fn list_tables(&self, like: Option<&str>) -> ClientResult<Vec<String>> {
        let response = self.worker.list_tables(&self.connection(), None).await?;
        let names = response.tables.into_iter().map(|t| t.name).collect();
        filter_tables(names, like)
    }

    /// Introspect `name` (optionally `schema.table`) into a table expression.
    pub async fn table(&self, name: &str) -> ClientResult<TableExpr> {
        let table_name = TableName::parse(name);
        let schema = table_name.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let response = self
            .worker
            .get_columns(&self.connection(), schema, &table_name.name)
            .await?;
        if response.columns.is_empty() {
            return Err(ClientError::TableNotFound(table_name.to_string()));
        }
        table_from_columns(table_name, response.columns)
    }

    /// Compile without executing.
    pub fn compile(
        &self,
        expr: impl Into<Expression>,
        params: &Params,
    ) -> ClientResult<CompiledQuery> {
        Ok(self.dialect.compile(expr, params)?)
    }

    /// Compile and run `expr`, capping the result at `limit`.
    pub async fn execute(
        &self,
        expr: impl Into<Expression>,
        limit: RowLimit,
        params: &Params,
    ) -> ClientResult<QueryResult> {
        let mut compiled = self.compile(expr, params)?;
        if let Some(n) = limit.resolve(self.settings.compiler.default_limit) {
            compiled = compiled.with_limit(n);
        }
        let args = compiled
            .positional_args()?
            .into_iter()
            .map(|(name, value)| QueryArg { name, value })
            .collect();

        let sql = compiled.to_sql();
        let response = self
            .worker
            .execute_query(&self.connection(), &sql, args)
            .await?;
        tracing::debug!(rows = response.row_count, "query executed");

        Ok(QueryResult {
            columns: response.columns.into_iter().map(|c| c.name).collect(),
            rows: response.rows,
        })
    }
}

/// Sort `names` and keep those matching the `like` regex.
pub fn filter_tables(mut names: Vec<String>, like: Option<&str>) -> ClientResult<Vec<String>> {
    if let Some(pattern) = like {
        let re = Regex::new(pattern)?;
        names.retain(|n| re.is_match(n));
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Build a table expression from introspected columns, in ordinal order.
pub fn table_from_columns(
    name: TableName,
    mut columns: Vec<ColumnInfo>,
) -> ClientResult<TableExpr> {
    columns.sort_by_key(|c| c.position);
    let mapper = MsSqlDialect::get().type_mapper();

    let typed = columns
        .iter()
        .map(|c| {
            let precision = c.numeric_precision.and_then(|p| u8::try_from(p).ok());
            let scale = c.numeric_scale.and_then(|s| u8::try_from(s).ok());
            mapper
                .from_native(&c.data_type, precision, scale)
                .map(|ty| (c.name.as_str(), ty))
                .ok_or_else(|| ClientError::UnmappedType {
                    column: c.name.clone(),
                    data_type: c.data_type.clone(),
                })
        })
        .collect::<ClientResult<Vec<(&str, LogicalType)>>>()?;

    let table = TableExpr::new(name.name, typed);
    Ok(match name.schema {
        Some(schema) => table.with_schema(schema),
        None => table,
    })
}

//! Worker-specific error types.

use std::io;
use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur during worker communication.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Failed to spawn the worker process.
    #[error("failed to spawn worker process: {0}")]
    SpawnFailed(#[source] io::Error),

    /// Worker binary could not be located.
    #[error("worker binary not found; set worker.path in mssql-compiler.toml")]
    NotFound,

    /// Failed to write to worker stdin.
    #[error("failed to write to worker: {0}")]
    WriteFailed(#[source] io::Error),

    /// Failed to serialize request to JSON.
    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// Failed to deserialize response from JSON.
    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// Request timed out waiting for response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Worker process exited unexpectedly.
    #[error("worker process exited unexpectedly")]
    WorkerExited,

    /// Response channel was closed (internal error).
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// Worker returned an error response.
    #[error("worker error: {message} (code: {code})")]
    Remote { code: String, message: String },

    /// Database driver not found.
    #[error("database driver not found: {0}")]
    DriverNotFound(String),

    /// Database connection failed.
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    /// The server rejected or failed the query.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Method not found.
    #[error("method not found: {0}")]
    MethodNotFound(String),
}

impl WorkerError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Map a worker error code onto a variant.
    pub fn classify(code: &str, message: &str) -> Self {
        match code {
            "DRIVER_NOT_FOUND" => Self::DriverNotFound(message.to_string()),
            "CONNECTION_FAILED" => Self::ConnectionFailed(message.to_string()),
            "QUERY_FAILED" => Self::QueryFailed(message.to_string()),
            "INVALID_REQUEST" => Self::InvalidRequest(message.to_string()),
            "METHOD_NOT_FOUND" => Self::MethodNotFound(message.to_string()),
            "WORKER_EXITED" => Self::WorkerExited,
            _ => Self::remote(code, message),
        }
    }

    /// Check if this error indicates the worker has exited.
    pub fn is_worker_exited(&self) -> bool {
        matches!(self, Self::WorkerExited | Self::ChannelClosed)
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::WorkerExited | Self::ChannelClosed
        )
    }
}

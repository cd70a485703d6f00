//! Worker communication module.
//!
//! SQL Server access goes through a long-running worker process that owns the
//! native driver. The compiler side stays driver-free.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │        MsSqlClient (Rust + Tokio)         │
//! │  ┌─────────────────────────────────────┐  │
//! │  │        WorkerClient (async)         │  │
//! │  │  - spawns the worker child process  │  │
//! │  │  - NDJSON over stdin/stdout         │  │
//! │  │  - request ids for correlation      │  │
//! │  └─────────────────────────────────────┘  │
//! └───────────────────────────────────────────┘
//!           stdin (NDJSON) │ stdout (NDJSON)
//!                          ▼
//! ┌───────────────────────────────────────────┐
//! │      mssql-worker (ODBC / TDS driver)     │
//! └───────────────────────────────────────────┘
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};

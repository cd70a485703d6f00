//! Configuration module.
//!
//! Handles connection options, environment variables, and settings.

mod connection;
mod settings;

pub use connection::{
    ConnectOptions, ConnectionConfig, ConnectionError, DEFAULT_ODBC_DRIVER, DEFAULT_PORT,
};
pub use settings::{
    expand_env_vars, CompilerSettings, ConnectionSettings, PoolSettings, Settings, SettingsError,
    WorkerSettings, CONFIG_ENV, CONFIG_FILE, WORKER_BINARY,
};

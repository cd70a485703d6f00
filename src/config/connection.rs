//! SQL Server connection options.
//!
//! Options can be built explicitly or read from the environment:
//! - `MSSQL_HOST`: server hostname (default `localhost`)
//! - `MSSQL_PORT`: port (default 1433)
//! - `MSSQL_DATABASE`: database name (default `master`)
//! - `MSSQL_USER` / `MSSQL_PASSWORD`: SQL login; without a user a trusted
//!   connection is requested
//! - `MSSQL_URL`: complete connection URL, overriding all of the above

use std::env;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Unsupported driver: {0}. Supported: mssql")]
    UnsupportedDriver(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Default ODBC driver requested from the worker.
pub const DEFAULT_ODBC_DRIVER: &str = "ODBC Driver 17 for SQL Server";

/// Connection options for a SQL Server client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server hostname.
    pub host: String,
    /// SQL login; `None` requests a trusted connection.
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: u16,
    pub database: String,
    /// Driver name the worker dispatches on.
    pub driver: String,
    /// ODBC driver the worker loads.
    pub odbc_driver: String,
    /// Complete connection URL. When set, the discrete fields are ignored.
    pub url: Option<String>,
}

/// The options `connect` accepts.
pub type ConnectOptions = ConnectionConfig;

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: None,
            password: None,
            port: DEFAULT_PORT,
            database: "master".to_string(),
            driver: "mssql".to_string(),
            odbc_driver: DEFAULT_ODBC_DRIVER.to_string(),
            url: None,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn odbc_driver(mut self, odbc_driver: impl Into<String>) -> Self {
        self.odbc_driver = odbc_driver.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Load options from `MSSQL_*` environment variables, with the same
    /// defaults as `ConnectionConfig::default()`.
    pub fn from_env() -> Result<Self, ConnectionError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("MSSQL_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("MSSQL_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConnectionError::InvalidPort(port.clone()))?;
        }
        if let Ok(database) = env::var("MSSQL_DATABASE") {
            config.database = database;
        }
        config.user = env::var("MSSQL_USER").ok();
        config.password = env::var("MSSQL_PASSWORD").ok();
        config.url = env::var("MSSQL_URL").ok();

        config.validate()?;
        Ok(config)
    }

    /// Whether Windows authentication is requested.
    pub fn trusted_connection(&self) -> bool {
        self.url.is_none() && self.user.is_none()
    }

    /// Check the options are usable.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        match self.driver.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => {}
            other => return Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
        if self.url.is_none() && self.user.is_none() && self.password.is_some() {
            return Err(ConnectionError::InvalidConfig(
                "password given without user".to_string(),
            ));
        }
        Ok(())
    }

    /// Connection string handed to the worker.
    pub fn to_connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let mut params = vec![format!("database={}", self.database)];
        if self.trusted_connection() {
            params.push("trusted_connection=true".to_string());
        } else if let Some(user) = &self.user {
            params.push(format!("user id={}", user));
            if let Some(pass) = &self.password {
                params.push(format!("password={}", pass));
            }
        }
        params.push(format!("odbc_driver={}", self.odbc_driver));

        format!(
            "sqlserver://{}:{}?{}",
            self.host,
            self.port,
            params.join("&")
        )
    }

    /// ODBC-style connection string for the same options.
    pub fn to_odbc_string(&self) -> String {
        let mut parts = vec![
            format!("DRIVER={{{}}}", self.odbc_driver),
            format!("SERVER={},{}", self.host, self.port),
            format!("DATABASE={}", self.database),
        ];
        if self.trusted_connection() {
            parts.push("Trusted_Connection=yes".to_string());
        } else if let Some(user) = &self.user {
            parts.push(format!("UID={}", user));
            if let Some(pass) = &self.password {
                parts.push(format!("PWD={}", pass));
            }
        }
        parts.join(";")
    }

    /// Driver name for the worker.
    pub fn driver_name(&self) -> &'static str {
        "mssql"
    }
}

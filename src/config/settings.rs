//! TOML-based configuration.
//!
//! Supports a config file (`mssql-compiler.toml`) with environment variable
//! expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.production]
//! url = "${PROD_MSSQL_URL}"
//!
//! [worker]
//! path = "/opt/mssql-worker/bin/mssql-worker"
//! timeout_secs = 60
//!
//! [worker.pool]
//! max_idle_conns = 5
//! max_open_conns = 10
//! conn_max_lifetime = "5m"
//! conn_max_idle_time = "1m"
//!
//! [compiler]
//! default_limit = 10000
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::ConnectionConfig;

/// Name of the local config file.
pub const CONFIG_FILE: &str = "mssql-compiler.toml";

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "MSSQL_COMPILER_CONFIG";

/// Worker binary name searched for when no path is configured.
pub const WORKER_BINARY: &str = "mssql-worker";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named connections.
    pub connections: BTreeMap<String, ConnectionSettings>,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Compiler and execution defaults.
    pub compiler: CompilerSettings,
}

/// A named connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Connection URL (supports ${ENV_VAR} expansion).
    pub url: String,

    /// ODBC driver override.
    #[serde(default)]
    pub odbc_driver: Option<String>,
}

impl ConnectionSettings {
    /// Connection options with the URL's environment variables expanded.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, SettingsError> {
        let mut config = ConnectionConfig::new().url(expand_env_vars(&self.url)?);
        if let Some(odbc) = &self.odbc_driver {
            config = config.odbc_driver(odbc.clone());
        }
        Ok(config)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to the worker binary.
    pub path: Option<String>,

    /// Seconds to wait for a response.
    pub timeout_secs: u64,

    /// Connection pool settings.
    pub pool: PoolSettings,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of idle connections per pool.
    pub max_idle_conns: u32,

    /// Maximum number of open connections per pool.
    pub max_open_conns: u32,

    /// Maximum connection lifetime (e.g., "5m", "1h").
    pub conn_max_lifetime: String,

    /// Maximum connection idle time (e.g., "1m", "30s").
    pub conn_max_idle_time: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 5,
            max_open_conns: 10,
            conn_max_lifetime: "5m".to_string(),
            conn_max_idle_time: "1m".to_string(),
        }
    }
}

impl PoolSettings {
    /// Convert to worker command-line arguments.
    pub fn to_worker_args(&self) -> Vec<String> {
        vec![
            "-pool".to_string(),
            format!("-pool-max-idle={}", self.max_idle_conns),
            format!("-pool-max-open={}", self.max_open_conns),
            format!("-pool-conn-lifetime={}", self.conn_max_lifetime),
            format!("-pool-conn-idle={}", self.conn_max_idle_time),
        ]
    }
}

/// Compiler and execution defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Row cap applied by `execute` unless the caller asks otherwise.
    pub default_limit: u64,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            default_limit: 10_000,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `MSSQL_COMPILER_CONFIG`
    /// 2. `./mssql-compiler.toml`
    /// 3. `~/.config/mssql-compiler/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("mssql-compiler").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// The "default" connection if defined, otherwise the first by name.
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections.iter().next().map(|(k, v)| (k.as_str(), v))
    }

    /// Connection options for `name`, or for the default connection when no
    /// name is given.
    pub fn connection_options(
        &self,
        name: Option<&str>,
    ) -> Result<ConnectionConfig, SettingsError> {
        let conn = match name {
            Some(name) => self.get_connection(name)?,
            None => match self.default_connection() {
                Some((_, conn)) => conn,
                None => return Err(SettingsError::ConnectionNotFound("default".to_string())),
            },
        };
        conn.to_connection_config()
    }

    /// Locate the worker binary: the configured path, a few local
    /// candidates, then `PATH`.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.worker.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let candidates = [
            format!("./{}", WORKER_BINARY),
            format!("./worker/{}", WORKER_BINARY),
        ];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        let path_var = env::var_os("PATH")?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(WORKER_BINARY))
            .find(|p| p.is_file())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // closing brace
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_'))
                .collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }
        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_braces() {
        env::set_var("MSSQL_COMPILER_TEST_VAR", "hello");
        assert_eq!(expand_env_vars("${MSSQL_COMPILER_TEST_VAR}").unwrap(), "hello");
        assert_eq!(
            expand_env_vars("prefix_${MSSQL_COMPILER_TEST_VAR}_suffix").unwrap(),
            "prefix_hello_suffix"
        );
        env::remove_var("MSSQL_COMPILER_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        env::set_var("MSSQL_COMPILER_TEST_VAR2", "world");
        assert_eq!(expand_env_vars("$MSSQL_COMPILER_TEST_VAR2").unwrap(), "world");
        assert_eq!(expand_env_vars("$MSSQL_COMPILER_TEST_VAR2!").unwrap(), "world!");
        assert_eq!(expand_env_vars("cost: $5").unwrap_err().to_string(), "Missing environment variable: 5");
        assert_eq!(expand_env_vars("a $ b").unwrap(), "a $ b");
        env::remove_var("MSSQL_COMPILER_TEST_VAR2");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("${NONEXISTENT_VAR_12345}");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[connections.production]
url = "sqlserver://db:1433?database=sales"

[connections.dev]
url = "sqlserver://localhost:1433?database=dev"
odbc_driver = "ODBC Driver 18 for SQL Server"

[worker]
timeout_secs = 5

[worker.pool]
max_idle_conns = 10
max_open_conns = 20

[compiler]
default_limit = 500
"#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert_eq!(settings.connections.len(), 2);
        assert_eq!(settings.default_connection().map(|(n, _)| n), Some("dev"));

        let dev = settings.get_connection("dev").unwrap();
        let config = dev.to_connection_config().unwrap();
        assert_eq!(config.odbc_driver, "ODBC Driver 18 for SQL Server");
        assert_eq!(
            config.to_connection_string(),
            "sqlserver://localhost:1433?database=dev"
        );

        assert_eq!(settings.worker.timeout_secs, 5);
        assert_eq!(settings.worker.pool.max_idle_conns, 10);
        assert_eq!(settings.compiler.default_limit, 500);
        assert!(settings.get_connection("missing").is_err());
    }

    #[test]
    fn test_connection_options_by_name() {
        env::set_var("MSSQL_COMPILER_TEST_URL", "sqlserver://prod:1433?database=sales");
        let settings: Settings = toml::from_str(
            r#"
[connections.default]
url = "${MSSQL_COMPILER_TEST_URL}"

[connections.dev]
url = "sqlserver://localhost:1433?database=dev"
"#,
        )
        .unwrap();

        let default = settings.connection_options(None).unwrap();
        assert_eq!(
            default.to_connection_string(),
            "sqlserver://prod:1433?database=sales"
        );
        let dev = settings.connection_options(Some("dev")).unwrap();
        assert_eq!(dev.url.as_deref(), Some("sqlserver://localhost:1433?database=dev"));
        assert!(matches!(
            settings.connection_options(Some("qa")),
            Err(SettingsError::ConnectionNotFound(_))
        ));
        assert!(matches!(
            Settings::default().connection_options(None),
            Err(SettingsError::ConnectionNotFound(_))
        ));
        env::remove_var("MSSQL_COMPILER_TEST_URL");
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.worker.timeout_secs, 30);
        assert_eq!(settings.worker.pool.max_idle_conns, 5);
        assert_eq!(settings.compiler.default_limit, 10_000);
        assert!(settings.default_connection().is_none());
    }

    #[test]
    fn test_pool_args() {
        let pool = PoolSettings::default();
        let args = pool.to_worker_args();

        assert!(args.contains(&"-pool".to_string()));
        assert!(args.contains(&"-pool-max-idle=5".to_string()));
        assert!(args.contains(&"-pool-max-open=10".to_string()));
    }
}

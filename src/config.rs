//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Per-request deadline applied by the todo routes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Which `TodoStore` backend to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// libSQL file at `ServerConfig::db_path`.
    Sqlite,
    /// Process-local map, lost on exit.
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "libsql" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::InvalidValue {
                key: "TODO_API_STORE".into(),
                message: format!("unknown store '{other}', expected 'sqlite' or 'memory'"),
            }),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (all interfaces).
    pub port: u16,
    /// Backend selection.
    pub store: StoreKind,
    /// Database file for the libSQL backend.
    pub db_path: PathBuf,
    /// Per-request deadline.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            store: StoreKind::Sqlite,
            db_path: PathBuf::from("./data/todo-api.db"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Load from environment variables, falling back to defaults for anything
    /// missing or unparsable. Only an unknown store name is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = lookup("SERVER_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let store = match lookup("TODO_API_STORE") {
            Some(s) => s.parse()?,
            None => defaults.store,
        };

        let db_path = lookup("TODO_API_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let request_timeout = lookup("TODO_API_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            port,
            store,
            db_path,
            request_timeout,
        })
    }
}

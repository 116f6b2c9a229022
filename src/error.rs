//! Error types for the todo API.

/// Top-level error type for process wiring.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Storage faults that are not a missing row.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Schema setup failed: {0}")]
    Migration(String),
}

/// Domain errors surfaced by stores and the service.
///
/// Callers match on the variant; the handler maps each one to an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("todo not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl TodoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::NotFound)
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TodoError::InvalidInput(_))
    }
}

/// Result type alias for process wiring.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the loadboard library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::OrderAction;

/// Comprehensive error type for all loadboard operations.
#[derive(Error, Debug)]
pub enum LoadboardError {
    /// Local mirror database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// The anti-forgery token could not be read; no request was sent
    #[error("Anti-forgery token is not available")]
    MissingToken,
    /// The host answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Http { status: u16, url: String },
    /// The request never produced a response
    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },
    /// A success response whose body could not be used
    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Another batch operation is still running on this processor
    #[error("A {action} batch operation is already in progress")]
    BatchInProgress { action: OrderAction },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> LoadboardError {
        LoadboardError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> LoadboardError {
        LoadboardError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl LoadboardError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a configuration error from a join failure of a blocking task.
    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {e}"),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| LoadboardError::database(message).with_source(e))
    }
}

/// Result type alias for loadboard operations
pub type Result<T> = std::result::Result<T, LoadboardError>;

//! Error types for grove-db.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for grove-db operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in grove-db operations.
#[derive(Debug, Error)]
pub enum DbError {
    // ========================================================================
    // Record errors
    // ========================================================================
    /// A record with the given id does not exist.
    #[error("{kind} record not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },

    /// Record file I/O error.
    #[error("Record I/O error at {path}: {message}")]
    RecordIo { path: PathBuf, message: String },

    /// Record file parse error.
    #[error("Record parse error at {path}: {message}")]
    RecordParse { path: PathBuf, message: String },

    /// A record failed validation before being written.
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    // ========================================================================
    // General errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a not-found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a record I/O error.
    pub fn record_io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RecordIo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a record parse error.
    pub fn record_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RecordParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-record error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

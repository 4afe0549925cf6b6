//! Error types for BlockDeck.
//!
//! The resolution engine itself is total: rendering, detection and page
//! building never fail. Errors only surface at the edges, when rows or
//! template configuration are loaded from disk or deserialized.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all BlockDeck operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Parse error (rows, template text)
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid template configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Validation error
    #[error("Validation error: {reason}")]
    ValidationError { reason: String },

    /// Unknown field referenced by a caller
    #[error("Unknown field: {field}")]
    UnknownField { field: String },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation_error(reason: impl Into<String>) -> Self {
        Error::ValidationError {
            reason: reason.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Error::UnknownField {
            field: field.into(),
        }
    }}

//! Error types for canopy.
//!
//! Reconciliation itself never fails: host operations are in-memory structural
//! mutations and caller contract violations degrade instead of erroring. What
//! remains is configuration loading, decoding of pasteboard tokens and the
//! consistency check the adapter runs on its live row mirror.

use std::path::PathBuf;

/// Result type alias for canopy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in canopy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration text could not be parsed.
    #[error("Invalid outline configuration: {message}")]
    ConfigParse { message: String },

    /// Configuration file could not be read.
    #[error("Failed to read outline configuration '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transfer token could not be written to or read from a pasteboard.
    #[error("Malformed transfer token: {message}")]
    TransferToken { message: String },

    /// The live row mirror disagrees with itself.
    ///
    /// This indicates a bug in the adapter, not a runtime condition.
    #[error("Live row invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Create a configuration parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    /// Create a configuration I/O error.
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Create a transfer token error.
    pub fn transfer_token(message: impl Into<String>) -> Self {
        Self::TransferToken {
            message: message.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

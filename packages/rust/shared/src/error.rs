//! Error types for jirest.
//!
//! Library crates use [`JirestError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all jirest operations.
///
/// Only `Fetch`, `Load` and `Store` are raised by the update pipeline; extraction
/// and normalization never fail, they degrade.
#[derive(Debug, thiserror::Error)]
pub enum JirestError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The reference document could not be fetched or read.
    #[error("failed to fetch API reference: {0}")]
    Fetch(String),

    /// The persisted catalog is missing or malformed.
    #[error("failed to load API definition from {path:?}: {message}")]
    Load { path: PathBuf, message: String },

    /// The persisted catalog could not be written.
    #[error("failed to store API definition at {path:?}: {message}")]
    Store { path: PathBuf, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unknown endpoint, invalid URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JirestError>;

impl JirestError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a catalog load error for `path`.
    pub fn load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a catalog store error for `path`.
    pub fn store(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Store {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Custom error types for ES Tech Loader
//!
//! This module provides a unified error type used by the config store, the
//! sync engine and the launcher. None of these errors are fatal: callers log
//! them and keep the best previously known state.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loader operations
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The cache file could not be replaced
    #[error("Cache write failed: {0}")]
    CacheWrite(#[source] std::io::Error),

    /// The local override exists but could not be read or decoded
    #[error("Local override unreadable: {0}")]
    LocalRead(String),

    /// A target was located but could not be opened
    #[error("Failed to launch {}: {reason}", location.display())]
    LaunchFailed { location: PathBuf, reason: String },

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors with a message
    #[error("{0}")]
    General(String),
}

impl LoaderError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a launch failure for a located target
    pub fn launch_failed(location: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::LaunchFailed {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Failures on the remote fetch path.
///
/// Every variant leaves the cache and the active configuration untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote returned HTTP {0}")]
    RemoteStatus(u16),

    #[error("decode error: {detail} (body starts with {body_snippet:?})")]
    Decode {
        detail: String,
        body_snippet: String,
    },
}

/// Result type alias using LoaderError
pub type Result<T> = std::result::Result<T, LoaderError>;

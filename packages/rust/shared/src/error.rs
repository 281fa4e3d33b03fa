//! Error types for the timeline builder.
//!
//! Library crates use [`TimelineError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all timeline operations.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure (connect error, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// The translation service asked us to slow down.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Malformed value in persisted or external data (e.g. an entry id).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Record store or ledger persistence error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Translation service error (API, or response shape).
    #[error("translation error: {0}")]
    Translation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad identifier, invalid template, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Spreadsheet read/write error.
    #[error("CSV error at {path:?}: {message}")]
    Csv { path: PathBuf, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TimelineError>;

impl TimelineError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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

    /// Wrap a spreadsheet error with the file it came from.
    pub fn csv(path: impl Into<PathBuf>, msg: impl std::fmt::Display) -> Self {
        Self::Csv {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    /// Whether a fetch that failed this way is worth retrying after a pause.
    ///
    /// Transport failures, server errors and 429s are; everything else
    /// (4xx, parse errors, local I/O) will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

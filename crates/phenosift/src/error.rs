//! Error types for the Phenosift library.
//!
//! Only wiring and IO problems live here. Problems with the *data* being
//! imported are never raised as errors; they come back to the caller as
//! [`crate::outcome::Outcome`] values with a `Fail` status.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Phenosift operations.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// MIME type has no delimiter mapping.
    #[error("Unsupported MIME type: {0}")]
    UnsupportedMimeType(String),

    /// MIME type maps to more than one delimiter and cannot be split
    /// without the caller disambiguating.
    #[error("MIME type '{mime}' admits {} delimiters; disambiguate by MIME type or explicit delimiter", delimiters.len())]
    AmbiguousMimeType { mime: String, delimiters: Vec<char> },

    /// Caller/wiring defect: a getter was read before its setter, a setter
    /// received malformed input, or a validator was handed the wrong input
    /// shape. These abort the run and are never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required collaborator (file access, backing store) could not be
    /// resolved.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Phenosift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

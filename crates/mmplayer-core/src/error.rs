//! Error types for the media player core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Caption errors
    #[error("Failed to fetch captions: {url}")]
    CaptionFetch { url: String, source: reqwest::Error },

    #[error("Caption request failed with HTTP {status}: {url}")]
    CaptionStatus { url: String, status: u16 },

    #[error("Malformed caption data attribute: {0}")]
    CaptionData(#[from] serde_json::Error),

    #[error("Invalid caption source: {0}")]
    CaptionSource(#[from] url::ParseError),

    // Backend errors
    #[error("Backend has no `{method}` method")]
    MissingMethod { method: &'static str },

    #[error("Property `{property}` is read-only on this backend")]
    ReadOnlyProperty { property: &'static str },

    #[error("Unknown player call: {0}")]
    UnknownCall(String),

    #[error("Expected a {expected} value for `{property}`")]
    ValueType {
        property: &'static str,
        expected: &'static str,
    },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing-method error
    pub fn missing(method: &'static str) -> Self {
        Error::MissingMethod { method }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::CaptionFetch { .. } | Error::CaptionStatus { .. } | Error::MissingMethod { .. }
        )
    }

    /// Returns the error code reported alongside load failures
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::CaptionFetch { .. } => "CAPTION_FETCH",
            Error::CaptionStatus { .. } => "CAPTION_STATUS",
            Error::CaptionData(_) => "CAPTION_DATA",
            Error::CaptionSource(_) => "CAPTION_SOURCE",
            Error::MissingMethod { .. } => "MISSING_METHOD",
            Error::ReadOnlyProperty { .. } => "READ_ONLY",
            Error::UnknownCall(_) => "UNKNOWN_CALL",
            Error::ValueType { .. } => "VALUE_TYPE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Internal(_) => "INTERNAL",
            Error::Io(_) => "IO",
        }
    }
}

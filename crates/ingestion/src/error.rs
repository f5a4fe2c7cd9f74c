//! Ingestion error types

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Malformed escape sequence in a delimiter specification
    #[error("invalid escape in delimiter {spec:?} at byte {position}: {message}")]
    InvalidEscape {
        /// Raw delimiter specification
        spec: String,
        /// Byte offset of the offending backslash
        position: usize,
        /// What is wrong with the escape
        message: String,
    },

    /// Delimiter specification compiled to zero bytes
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    /// Tokenizer configuration rejected
    #[error("invalid tokenizer configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// No delimiter found within the buffer limit
    #[error("token exceeds maximum buffer size of {limit} bytes without a delimiter")]
    TokenTooLarge {
        /// Configured maximum buffer size
        limit: usize,
    },

    /// Reading the byte source failed
    #[error("failed to read input: {source}")]
    SourceRead {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl IngestionError {
    /// Create an invalid escape error
    pub fn invalid_escape(spec: &str, position: usize, message: impl Into<String>) -> Self {
        Self::InvalidEscape {
            spec: spec.to_string(),
            position,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;

//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Token stream ended between a key and its value
    #[error("input ended after key of record {sequence} without a value (missing final value delimiter)")]
    TruncatedPair { sequence: u64 },

    /// First failed delivery reported by the client
    #[error("unable to produce record {sequence} to topic '{topic}': {source}")]
    Delivery {
        sequence: u64,
        topic: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Client refused a submission
    #[error("unable to submit record {sequence}: {source}")]
    Submit {
        sequence: u64,
        #[source]
        source: contracts::ContractError,
    },

    /// Client creation error
    #[error("failed to create delivery client '{name}': {message}")]
    ClientCreation { name: String, message: String },

    /// Tokenization error
    #[error(transparent)]
    Source(#[from] ingestion::IngestionError),

    /// Writing delivery reports failed
    #[error("failed to write delivery report: {0}")]
    Output(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a client creation error
    pub fn client_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ClientCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

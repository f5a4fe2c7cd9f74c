//! Tokenizer configuration and metrics

use std::sync::atomic::{AtomicU64, Ordering};

use crate::delimiter::CompiledDelimiter;
use crate::error::{IngestionError, Result};

/// Default maximum token buffer (64 KiB)
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 64 * 1024;

/// Default read chunk size
pub const DEFAULT_READ_CHUNK_SIZE: usize = 16 * 1024;

/// Tokenizer configuration
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Maximum bytes held without a delimiter match; every token is strictly smaller
    pub max_token_size: usize,

    /// Upper bound on bytes requested from the source per read
    pub read_chunk_size: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl TokenizerConfig {
    /// Create new tokenizer configuration
    pub fn new(max_token_size: usize) -> Self {
        Self {
            max_token_size,
            ..Default::default()
        }
    }

    /// Override the read chunk size
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    /// Check the limits against the delimiter they will be used with
    ///
    /// # Errors
    /// `InvalidConfig` when the buffer cannot hold the delimiter plus one
    /// byte, or the read chunk size is zero.
    pub fn validate(&self, delimiter: &CompiledDelimiter) -> Result<()> {
        if self.max_token_size <= delimiter.len() {
            return Err(IngestionError::invalid_config(format!(
                "max token size ({}) must exceed delimiter length ({})",
                self.max_token_size,
                delimiter.len()
            )));
        }
        if self.read_chunk_size == 0 {
            return Err(IngestionError::invalid_config("read chunk size must be > 0"));
        }
        Ok(())
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Tokens emitted
    pub tokens_emitted: AtomicU64,

    /// Token bytes emitted (delimiters excluded)
    pub token_bytes: AtomicU64,

    /// Bytes read from the source
    pub bytes_read: AtomicU64,

    /// Read calls issued against the source
    pub reads: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token emitted
    pub fn record_token(&self, len: usize) {
        self.tokens_emitted.fetch_add(1, Ordering::Relaxed);
        self.token_bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Record a source read
    pub fn record_read(&self, len: usize) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tokens_emitted: self.tokens_emitted.load(Ordering::Relaxed),
            token_bytes: self.token_bytes.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Tokens emitted
    pub tokens_emitted: u64,

    /// Token bytes emitted
    pub token_bytes: u64,

    /// Bytes read from the source
    pub bytes_read: u64,

    /// Read calls issued
    pub reads: u64,
}

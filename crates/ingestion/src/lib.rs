//! # Ingestion Pipeline
//!
//! Byte stream ingestion module.
//!
//! Responsibilities:
//! - Compile escape-encoded delimiter specifications into literal bytes
//! - Split an unbounded byte stream into tokens under a fixed memory budget
//! - Expose tokens through the `TokenSource` interface
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{compile, StreamTokenizer, TokenizerConfig, TokenSource};
//!
//! let delimiter = compile("\\n")?;
//! let mut tokenizer = StreamTokenizer::new(tokio::io::stdin(), delimiter, TokenizerConfig::default())?;
//! while let Some(token) = tokenizer.next_token().await? {
//!     // Process token
//! }
//! ```

mod config;
mod delimiter;
mod error;
mod source;
mod tokenizer;

// Re-exports
pub use config::{IngestionMetrics, MetricsSnapshot, TokenizerConfig};
pub use delimiter::{compile, CompiledDelimiter};
pub use error::{IngestionError, Result};
pub use source::{LocalTokenSource, TokenSource, VecTokenSource};
pub use tokenizer::StreamTokenizer;

//! Stream tokenizer
//!
//! Splits an async byte source on a compiled delimiter while holding at most
//! `max_token_size` unmatched bytes in memory.

use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument, trace, warn};

use crate::config::{IngestionMetrics, TokenizerConfig};
use crate::delimiter::CompiledDelimiter;
use crate::error::{IngestionError, Result};
use crate::source::TokenSource;

/// Incremental tokenizer over an `AsyncRead` source
///
/// Tokenizing a non-empty stream yields exactly `split(stream, delimiter)`:
/// a leading delimiter gives an empty first token, a trailing delimiter gives
/// an empty last token and an unterminated remainder is emitted as the final
/// token. An empty stream yields nothing.
pub struct StreamTokenizer<R> {
    reader: R,
    delimiter: CompiledDelimiter,
    config: TokenizerConfig,

    /// Unconsumed bytes, never longer than `max_token_size`
    buf: BytesMut,

    /// Prefix of `buf` already searched without a match
    scanned: usize,

    /// Last bytes consumed were a delimiter; a (possibly empty) token follows
    after_delimiter: bool,

    /// Source returned end-of-stream
    eof: bool,

    /// Sequence finished; every further call yields `None`
    finished: bool,

    metrics: Arc<IngestionMetrics>,
}

impl<R> StreamTokenizer<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a tokenizer
    ///
    /// # Errors
    /// `InvalidConfig` when the buffer cannot hold the delimiter plus one
    /// byte, or the read chunk size is zero.
    pub fn new(reader: R, delimiter: CompiledDelimiter, config: TokenizerConfig) -> Result<Self> {
        config.validate(&delimiter)?;

        Ok(Self {
            reader,
            delimiter,
            buf: BytesMut::with_capacity(config.read_chunk_size.min(config.max_token_size)),
            config,
            scanned: 0,
            after_delimiter: false,
            eof: false,
            finished: false,
            metrics: Arc::new(IngestionMetrics::new()),
        })
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Produce the next token, reading from the source as needed
    ///
    /// Cancel safe: all progress lives in `self`, and a cancelled read has
    /// consumed nothing.
    pub async fn next_token(&mut self) -> Result<Option<Bytes>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if let Some(token) = self.split_buffered() {
                return Ok(Some(self.emit(token)));
            }

            if self.buf.len() >= self.config.max_token_size {
                self.finished = true;
                warn!(
                    limit = self.config.max_token_size,
                    "no delimiter within maximum token size"
                );
                return Err(IngestionError::TokenTooLarge {
                    limit: self.config.max_token_size,
                });
            }

            if self.eof {
                return Ok(self.finish());
            }

            self.fill().await?;
        }
    }

    /// Split the first delimited token off the buffer, if one is complete
    fn split_buffered(&mut self) -> Option<Bytes> {
        let overlap = self.delimiter.len() - 1;
        let start = self.scanned.saturating_sub(overlap);

        match self.delimiter.find_in(&self.buf[start..]) {
            Some(rel) => {
                let idx = start + rel;
                let token = self.buf.split_to(idx).freeze();
                self.buf.advance(self.delimiter.len());
                self.scanned = 0;
                self.after_delimiter = true;
                Some(token)
            }
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }

    /// Handle end-of-stream once the buffer holds no further delimiter
    fn finish(&mut self) -> Option<Bytes> {
        self.finished = true;

        if !self.buf.is_empty() {
            let remainder = self.buf.split().freeze();
            debug!(len = remainder.len(), "emitting unterminated final token");
            return Some(self.emit(remainder));
        }

        if self.after_delimiter {
            trace!("stream ended on a delimiter, emitting empty final token");
            return Some(self.emit(Bytes::new()));
        }

        None
    }

    fn emit(&mut self, token: Bytes) -> Bytes {
        self.metrics.record_token(token.len());
        token
    }

    /// Read more bytes, never growing the buffer past `max_token_size`
    #[instrument(name = "tokenizer_fill", level = "trace", skip(self), fields(buffered = self.buf.len()))]
    async fn fill(&mut self) -> Result<()> {
        let room = self.config.max_token_size - self.buf.len();
        let want = room.min(self.config.read_chunk_size);
        self.buf.reserve(want);

        let mut limited = (&mut self.reader).take(want as u64);
        let n = limited.read_buf(&mut self.buf).await?;
        self.metrics.record_read(n);

        if n == 0 {
            trace!("source exhausted");
            self.eof = true;
        }
        Ok(())
    }
}

impl<R> TokenSource for StreamTokenizer<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_token(&mut self) -> Result<Option<Bytes>> {
        StreamTokenizer::next_token(self).await
    }
}

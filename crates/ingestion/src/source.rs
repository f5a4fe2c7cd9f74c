//! TokenSource trait - tokenizer output interface

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::Result;

/// Lazy, forward-only sequence of tokens
///
/// `Ok(None)` marks exhaustion; once returned, the sequence is finished.
#[trait_variant::make(TokenSource: Send)]
pub trait LocalTokenSource {
    /// Produce the next token
    ///
    /// # Errors
    /// Fatal tokenization errors (oversized token, read failure)
    async fn next_token(&mut self) -> Result<Option<Bytes>>;
}

/// In-memory token source over pre-split tokens
#[derive(Debug, Default)]
pub struct VecTokenSource {
    tokens: VecDeque<Bytes>,
}

impl VecTokenSource {
    /// Create from any iterator of token-like values
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

impl TokenSource for VecTokenSource {
    async fn next_token(&mut self) -> Result<Option<Bytes>> {
        Ok(self.tokens.pop_front())
    }
}

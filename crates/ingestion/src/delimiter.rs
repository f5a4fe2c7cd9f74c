//! Delimiter compiler
//!
//! Turns a user-supplied delimiter specification into the literal bytes the
//! tokenizer splits on. Understands `\t`, `\n`, `\r` and `\xHH` escapes.

use std::fmt;

use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};

/// Literal, non-empty delimiter byte sequence
#[derive(Clone, PartialEq, Eq)]
pub struct CompiledDelimiter(Vec<u8>);

impl CompiledDelimiter {
    /// Wrap literal bytes, rejecting an empty sequence
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(IngestionError::EmptyDelimiter);
        }
        Ok(Self(bytes))
    }

    /// Delimiter bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Delimiter length in bytes (never zero)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Leftmost occurrence of the delimiter in `haystack`
    pub fn find_in(&self, haystack: &[u8]) -> Option<usize> {
        if haystack.len() < self.0.len() {
            return None;
        }
        haystack
            .windows(self.0.len())
            .position(|window| window == self.0.as_slice())
    }
}

impl fmt::Debug for CompiledDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompiledDelimiter(\"{}\")", self.0.escape_ascii())
    }
}

/// Compile a delimiter specification
///
/// Literal characters are copied verbatim; a backslash selects an escape.
///
/// # Errors
/// - `InvalidEscape` for a trailing backslash, an unknown escape selector, or
///   a `\x` escape without two hex digits
/// - `EmptyDelimiter` when the specification is empty
#[instrument(name = "ingestion_compile_delimiter", level = "debug")]
pub fn compile(spec: &str) -> Result<CompiledDelimiter> {
    let raw = spec.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut pos = 0;

    while pos < raw.len() {
        let byte = raw[pos];
        if byte != b'\\' {
            out.push(byte);
            pos += 1;
            continue;
        }

        let Some(&selector) = raw.get(pos + 1) else {
            return Err(IngestionError::invalid_escape(
                spec,
                pos,
                "backslash at end of delimiter",
            ));
        };

        match selector {
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b'x' => {
                out.push(parse_hex_escape(spec, pos)?);
                pos += 2;
            }
            _ => {
                // pos + 1 follows an ASCII backslash, so it is a char boundary
                let shown = spec[pos + 1..].chars().next().unwrap_or_default();
                return Err(IngestionError::invalid_escape(
                    spec,
                    pos,
                    format!("unknown escape sequence \\{shown}"),
                ));
            }
        }
        pos += 2;
    }

    let delimiter = CompiledDelimiter::new(out)?;
    debug!(delimiter = ?delimiter, "compiled delimiter");
    Ok(delimiter)
}

/// Parse the two hex digits following `\x` at `pos`
fn parse_hex_escape(spec: &str, pos: usize) -> Result<u8> {
    let raw = spec.as_bytes();
    let digits = raw.get(pos + 2..pos + 4).ok_or_else(|| {
        IngestionError::invalid_escape(spec, pos, "non-terminated hex escape at end of delimiter")
    })?;

    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(IngestionError::invalid_escape(
            spec,
            pos,
            format!("invalid hex escape \\x{}", digits.escape_ascii()),
        ));
    }

    // Both bytes are ASCII hex digits here
    let text = std::str::from_utf8(digits).unwrap_or_default();
    u8::from_str_radix(text, 16).map_err(|e| {
        IngestionError::invalid_escape(spec, pos, format!("invalid hex escape \\x{text}: {e}"))
    })
}

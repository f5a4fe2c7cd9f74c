//! RecordUnit - Dispatch Coordinator output
//!
//! The unit of delivery and the position a client assigns to it.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One record destined for a topic
///
/// Built by pairing tokens (key/value mode) or from a single token
/// (value-only mode). Ownership moves to the delivery client on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUnit {
    /// Destination topic
    pub topic: String,

    /// Optional record key
    pub key: Option<Bytes>,

    /// Record value
    pub value: Bytes,
}

impl RecordUnit {
    /// Create an unkeyed record
    pub fn value_only(topic: impl Into<String>, value: Bytes) -> Self {
        Self {
            topic: topic.into(),
            key: None,
            value,
        }
    }

    /// Create a keyed record
    pub fn keyed(topic: impl Into<String>, key: Bytes, value: Bytes) -> Self {
        Self {
            topic: topic.into(),
            key: Some(key),
            value,
        }
    }
}

/// Delivery position assigned by the client on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Topic the record landed in
    pub topic: String,

    /// Partition within the topic
    pub partition: i32,

    /// Offset within the partition
    pub offset: i64,
}

impl fmt::Display for DeliveryReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "topic {} partition {} offset {}",
            self.topic, self.partition, self.offset
        )
    }
}

/// Batch compression scheme, forwarded opaquely to the delivery client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Gzip,
    #[default]
    Snappy,
    Lz4,
    Zstd,
}

impl Compression {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "gzip" => Ok(Self::Gzip),
            "snappy" => Ok(Self::Snappy),
            "lz4" => Ok(Self::Lz4),
            "zstd" => Ok(Self::Zstd),
            other => Err(format!(
                "unknown compression '{other}' (expected none, gzip, snappy, lz4, zstd)"
            )),
        }
    }
}

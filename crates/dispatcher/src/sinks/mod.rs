//! Sink implementations
//!
//! Contains LogSink, FileSink, and NetworkSink.

mod file;
mod log;
mod network;

use std::collections::HashMap;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};

/// Partition every built-in sink assigns
pub const DEFAULT_PARTITION: i32 = 0;

/// Next offset per topic
#[derive(Debug, Default)]
pub(crate) struct TopicOffsets {
    next: HashMap<String, i64>,
}

impl TopicOffsets {
    /// Offset the next record of `topic` receives, without assigning it
    pub(crate) fn peek(&self, topic: &str) -> i64 {
        self.next.get(topic).copied().unwrap_or(0)
    }

    /// Assign the next offset of `topic`
    pub(crate) fn assign(&mut self, topic: &str) -> i64 {
        let next = self.next.entry(topic.to_string()).or_insert(0);
        let offset = *next;
        *next += 1;
        offset
    }
}

//! LogSink - logs record summaries via tracing

use contracts::{Compression, ContractError, DeliveryReceipt, RecordSink, RecordUnit};
use tracing::{info, instrument};

use super::{TopicOffsets, DEFAULT_PARTITION};

/// Sink that logs each record for debugging and dry runs
pub struct LogSink {
    name: String,
    compression: Compression,
    offsets: TopicOffsets,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>, compression: Compression) -> Self {
        Self {
            name: name.into(),
            compression,
            offsets: TopicOffsets::default(),
        }
    }

    fn log_record_summary(&self, unit: &RecordUnit, offset: i64) {
        info!(
            sink = %self.name,
            topic = %unit.topic,
            partition = DEFAULT_PARTITION,
            offset,
            key_len = unit.key.as_ref().map(|k| k.len()),
            value_len = unit.value.len(),
            compression = %self.compression,
            "Record delivered"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, unit),
        fields(sink = %self.name, topic = %unit.topic)
    )]
    async fn write(&mut self, unit: &RecordUnit) -> Result<DeliveryReceipt, ContractError> {
        let offset = self.offsets.assign(&unit.topic);
        self.log_record_summary(unit, offset);
        Ok(DeliveryReceipt {
            topic: unit.topic.clone(),
            partition: DEFAULT_PARTITION,
            offset,
        })
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

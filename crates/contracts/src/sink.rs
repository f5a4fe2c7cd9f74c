//! RecordSink trait - delivery client backend interface
//!
//! Defines the abstract interface for the transports a delivery client drives.

use crate::{ContractError, DeliveryReceipt, RecordUnit};

/// Record output trait
///
/// All sink implementations must implement this trait. A sink is driven by a
/// single worker task, so `write` calls never overlap.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one record and return the position it was assigned
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, unit: &RecordUnit) -> Result<DeliveryReceipt, ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}

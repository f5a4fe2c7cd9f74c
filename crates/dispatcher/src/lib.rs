//! # Dispatcher
//!
//! Record dispatch module.
//!
//! Responsibilities:
//! - Pair tokens into `RecordUnit`s (key/value or value-only)
//! - Submit units to a delivery client without waiting for each delivery
//! - Track in-flight units with a completion barrier, fail fast on the first
//!   delivery error
//! - Provide delivery clients backed by log / file / network sinks

pub mod barrier;
pub mod coordinator;
pub mod error;
pub mod factory;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use barrier::CompletionBarrier;
pub use contracts::{DeliveryClient, RecordSink, RecordUnit};
pub use coordinator::{CoordinatorConfig, DispatchCoordinator, PairingMode, ProduceSummary};
pub use error::DispatcherError;
pub use factory::create_client;
pub use handle::DeliveryHandle;
pub use metrics::{ClientMetrics, MetricsSnapshot};
pub use sinks::{FileSink, LogSink, NetworkSink};

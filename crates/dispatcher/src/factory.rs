//! Delivery client construction from configuration

use contracts::{ClientConfig, ClientKind, Compression};
use tracing::{info, instrument};

use crate::error::DispatcherError;
use crate::handle::DeliveryHandle;
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Create a delivery client from configuration
///
/// The client is built once at startup and handed to the coordinator.
#[instrument(
    name = "dispatcher_create_client",
    skip(config),
    fields(client = %config.name, kind = ?config.kind, compression = %compression)
)]
pub async fn create_client(
    config: &ClientConfig,
    compression: Compression,
) -> Result<DeliveryHandle, DispatcherError> {
    let handle = match config.kind {
        ClientKind::Log => {
            let sink = LogSink::new(&config.name, compression);
            DeliveryHandle::spawn(sink, config.queue_capacity)
        }
        ClientKind::File => {
            let sink = FileSink::from_params(&config.name, &config.params, compression)
                .map_err(|e| DispatcherError::client_creation(&config.name, e.to_string()))?;
            DeliveryHandle::spawn(sink, config.queue_capacity)
        }
        ClientKind::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params, compression)
                .await
                .map_err(|e| DispatcherError::client_creation(&config.name, e.to_string()))?;
            DeliveryHandle::spawn(sink, config.queue_capacity)
        }
    };

    info!(client = %config.name, kind = ?config.kind, "Delivery client ready");
    Ok(handle)
}

//! NetworkSink - one UDP datagram per record

use contracts::{Compression, ContractError, DeliveryReceipt, RecordSink, RecordUnit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

use super::{TopicOffsets, DEFAULT_PARTITION};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max datagram size (UDP payload limit is 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(s) => s
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{}': {}", s, e))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Wire envelope of one record
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordEnvelope<'a> {
    pub topic: &'a str,
    pub partition: i32,
    pub offset: i64,
    pub compression: Compression,
    #[serde(borrow)]
    pub key: Option<&'a [u8]>,
    pub value: &'a [u8],
}

/// Sink that sends records over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    compression: Compression,
    offsets: TopicOffsets,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(
        name: impl Into<String>,
        config: NetworkSinkConfig,
        compression: Compression,
    ) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr = if config.addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            compression,
            offsets: TopicOffsets::default(),
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        compression: Compression,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation("client.params", e))?;

        Self::new(name.clone(), config, compression)
            .await
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))
    }

    fn serialize_envelope(&self, envelope: &RecordEnvelope<'_>) -> Result<Vec<u8>, String> {
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(envelope).map_err(|e| format!("json error: {}", e))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(envelope).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))
    }

    fn prepare_payload(&self, unit: &RecordUnit, offset: i64) -> Result<Vec<u8>, ContractError> {
        let envelope = RecordEnvelope {
            topic: &unit.topic,
            partition: DEFAULT_PARTITION,
            offset,
            compression: self.compression,
            key: unit.key.as_deref(),
            value: &unit.value,
        };
        let data = self
            .serialize_envelope(&envelope)
            .map_err(|e| ContractError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Record exceeds max datagram size"
            );
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "record of {} bytes exceeds max datagram size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8]) -> Result<(), ContractError> {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(sink = %self.name, bytes = sent, "Sent");
                Ok(())
            }
            Err(e) => {
                error!(sink = %self.name, error = %e, "UDP send failed");
                Err(ContractError::sink_write(&self.name, e.to_string()))
            }
        }
    }
}

impl RecordSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, unit),
        fields(sink = %self.name, topic = %unit.topic)
    )]
    async fn write(&mut self, unit: &RecordUnit) -> Result<DeliveryReceipt, ContractError> {
        // Offsets are only consumed by records that actually left the socket
        let offset = self.offsets.peek(&unit.topic);
        let socket = self.socket()?;
        let data = self.prepare_payload(unit, offset)?;
        self.transmit(socket, &data).await?;
        self.offsets.assign(&unit.topic);

        Ok(DeliveryReceipt {
            topic: unit.topic.clone(),
            partition: DEFAULT_PARTITION,
            offset,
        })
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    async fn receiver() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    #[test]
    fn test_network_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "bincode".to_string());

        let config = NetworkSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Bincode);
        assert_eq!(config.max_packet_size, 65000);
    }

    #[test]
    fn test_network_sink_config_errors() {
        assert!(NetworkSinkConfig::from_params(&HashMap::new()).is_err());

        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "xml".to_string());
        assert!(NetworkSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_network_sink_json_envelope() {
        let (rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };
        let mut sink = NetworkSink::new("test_net", config, Compression::Lz4)
            .await
            .unwrap();

        let unit = RecordUnit::keyed("events", Bytes::from_static(b"k"), Bytes::from_static(b"v"));
        let receipt = sink.write(&unit).await.unwrap();
        assert_eq!(receipt.offset, 0);

        let mut buf = vec![0u8; 65536];
        let n = rx.recv(&mut buf).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(value["topic"], "events");
        assert_eq!(value["compression"], "lz4");
        assert_eq!(value["key"], serde_json::json!([b'k']));
        assert_eq!(value["value"], serde_json::json!([b'v']));
    }

    #[tokio::test]
    async fn test_network_sink_bincode_envelope() {
        let (rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Bincode,
            max_packet_size: 65000,
        };
        let mut sink = NetworkSink::new("test_net", config, Compression::Snappy)
            .await
            .unwrap();

        let unit = RecordUnit::value_only("events", Bytes::from_static(b"payload"));
        sink.write(&unit).await.unwrap();
        sink.write(&unit).await.unwrap();

        let mut buf = vec![0u8; 65536];
        rx.recv(&mut buf).await.unwrap();
        let n = rx.recv(&mut buf).await.unwrap();
        let envelope: RecordEnvelope<'_> = bincode::deserialize(&buf[..n]).unwrap();
        assert_eq!(envelope.offset, 1);
        assert_eq!(envelope.key, None);
        assert_eq!(envelope.value, b"payload");
    }

    #[tokio::test]
    async fn test_network_sink_rejects_oversized_record() {
        let (_rx, addr) = receiver().await;
        let config = NetworkSinkConfig {
            addr,
            format: NetworkFormat::Bincode,
            max_packet_size: 16,
        };
        let mut sink = NetworkSink::new("test_net", config, Compression::None)
            .await
            .unwrap();

        let unit = RecordUnit::value_only("events", Bytes::from(vec![b'x'; 64]));
        let err = sink.write(&unit).await.unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));

        // The failed record did not consume an offset
        let small = RecordUnit::value_only("e", Bytes::new());
        sink.config.max_packet_size = 65000;
        assert_eq!(sink.write(&small).await.unwrap().offset, 0);
    }
}

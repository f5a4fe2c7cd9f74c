//! Pipeline orchestrator - wires tokenizer, coordinator and delivery client.

use std::io::Write;

use anyhow::{Context, Result};
use contracts::{Compression, ProducerConfig};
use dispatcher::{CoordinatorConfig, DispatchCoordinator, PairingMode};
use ingestion::{CompiledDelimiter, StreamTokenizer, TokenizerConfig};
use tokio::io::AsyncRead;
use tracing::{info, instrument};

use super::PipelineStats;

/// Pipeline configuration
///
/// Everything here is validated before the input stream is touched.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Destination topic
    pub topic: String,

    /// Compiled record delimiter
    pub delimiter: CompiledDelimiter,

    /// Key/value or value-only pairing
    pub mode: PairingMode,

    /// Report each successful delivery
    pub verbose: bool,

    /// Tokenizer limits
    pub tokenizer: TokenizerConfig,

    /// Compression forwarded to the delivery client
    pub compression: Compression,

    /// Delivery client configuration
    pub producer: ProducerConfig,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline until `input` is exhausted and every record is delivered
    ///
    /// Verbose delivery reports go to `out`.
    #[instrument(
        name = "pipeline_run",
        skip(self, input, out),
        fields(topic = %self.config.topic, client = %self.config.producer.client.name)
    )]
    pub async fn run<R, W>(self, input: R, out: &mut W) -> Result<PipelineStats>
    where
        R: AsyncRead + Unpin + Send,
        W: Write,
    {
        let config = self.config;

        // Initialize Metrics (optional)
        if let Some(port) = config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        // The client is built once here and shared with the coordinator by reference
        let client = dispatcher::create_client(&config.producer.client, config.compression)
            .await
            .context("Failed to create delivery client")?;

        let mut tokenizer =
            StreamTokenizer::new(input, config.delimiter, config.tokenizer)
                .context("Invalid tokenizer configuration")?;
        let ingestion_metrics = tokenizer.metrics();

        let coordinator_config =
            CoordinatorConfig::new(config.topic, config.mode).with_verbose(config.verbose);

        info!(mode = ?config.mode, compression = %config.compression, "Starting produce run");

        let outcome = DispatchCoordinator::new(&client, coordinator_config)
            .run(&mut tokenizer, out)
            .await;

        let summary = match outcome {
            Ok(summary) => summary,
            // In-flight deliveries are abandoned; the caller exits without awaiting them
            Err(e) => return Err(e).context("Produce run failed"),
        };

        let client_metrics = client.metrics().snapshot();
        client.shutdown().await;

        Ok(PipelineStats {
            summary,
            ingestion: ingestion_metrics.snapshot(),
            client: client_metrics,
        })
    }
}

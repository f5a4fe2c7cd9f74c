//! `produce` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use dispatcher::PairingMode;
use ingestion::TokenizerConfig;
use tracing::info;

use crate::cli::ProduceArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `produce` command
pub async fn run_produce(args: &ProduceArgs) -> Result<()> {
    // Configuration errors surface before stdin is read
    let pipeline_config = build_pipeline_config(args)?;

    info!(
        topic = %pipeline_config.topic,
        delimiter = ?pipeline_config.delimiter,
        mode = ?pipeline_config.mode,
        client = %pipeline_config.producer.client.name,
        kind = ?pipeline_config.producer.client.kind,
        "Configuration loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stats = Pipeline::new(pipeline_config)
        .run(tokio::io::stdin(), &mut out)
        .await?;

    info!(
        records = stats.summary.units_acknowledged,
        bytes = stats.summary.bytes,
        duration_secs = stats.summary.duration.as_secs_f64(),
        "Produce completed successfully"
    );

    // Print detailed statistics
    if tracing::enabled!(tracing::Level::DEBUG) {
        stats.print_summary();
    }

    Ok(())
}

/// Resolve CLI arguments into a validated pipeline configuration
pub fn build_pipeline_config(args: &ProduceArgs) -> Result<PipelineConfig> {
    let (spec, keyed) = args.delimiter_spec();
    let delimiter = ingestion::compile(spec)
        .with_context(|| format!("Invalid delimiter {spec:?}"))?;
    let tokenizer = TokenizerConfig::new(args.max_read_buf);
    tokenizer
        .validate(&delimiter)
        .context("Invalid --max-read-buf")?;
    let mode = if keyed {
        PairingMode::KeyValue
    } else {
        PairingMode::ValueOnly
    };

    let mut producer = ConfigLoader::load_or_default(args.config.as_deref()).with_context(|| {
        match args.config {
            Some(ref path) => format!("Failed to load config from {}", path.display()),
            None => "Invalid default client configuration".to_string(),
        }
    })?;
    ConfigLoader::apply_client_opts(&mut producer, &args.client_opts)
        .context("Invalid client option")?;

    Ok(PipelineConfig {
        topic: args.topic.clone(),
        delimiter,
        mode,
        verbose: args.verbose,
        tokenizer,
        compression: args.compression,
        producer,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use contracts::ClientKind;

    fn produce_args(argv: &[&str]) -> ProduceArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Produce(args) => args,
            _ => panic!("expected produce"),
        }
    }

    #[test]
    fn test_default_config_is_value_only_log_client() {
        let config = build_pipeline_config(&produce_args(&["streamcast", "produce", "t"])).unwrap();
        assert_eq!(config.mode, PairingMode::ValueOnly);
        assert_eq!(config.delimiter.as_bytes(), b"\n");
        assert_eq!(config.producer.client.kind, ClientKind::Log);
        assert_eq!(config.tokenizer.max_token_size, 65536);
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_keyed_delimiter_selects_key_value_mode() {
        let args = produce_args(&["streamcast", "produce", "t", "-D", ",", "-K", "\\x1f"]);
        let config = build_pipeline_config(&args).unwrap();
        assert_eq!(config.mode, PairingMode::KeyValue);
        assert_eq!(config.delimiter.as_bytes(), &[0x1f]);
    }

    #[test]
    fn test_invalid_delimiter_is_config_error() {
        let args = produce_args(&["streamcast", "produce", "t", "-D", "\\q"]);
        let err = build_pipeline_config(&args).unwrap_err();
        assert!(err.to_string().contains("Invalid delimiter"));
    }

    #[test]
    fn test_read_buf_must_exceed_delimiter() {
        let args = produce_args(&["streamcast", "produce", "t", "-D", "::", "--max-read-buf", "2"]);
        let err = build_pipeline_config(&args).unwrap_err();
        assert!(err.to_string().contains("--max-read-buf"), "got: {err:#}");
    }

    #[test]
    fn test_malformed_client_opt_is_config_error() {
        let args = produce_args(&["streamcast", "produce", "t", "-X", "novalue"]);
        let err = build_pipeline_config(&args).unwrap_err();
        assert!(format!("{err:#}").contains("missing '='"), "got: {err:#}");
    }

    #[test]
    fn test_client_opt_reaches_params() {
        let args = produce_args(&["streamcast", "produce", "t", "-X", "dir=./out"]);
        let config = build_pipeline_config(&args).unwrap();
        assert_eq!(
            config.producer.client.params.get("dir").map(String::as_str),
            Some("./out")
        );
    }

    #[test]
    fn test_missing_config_file() {
        let args = produce_args(&["streamcast", "produce", "t", "-c", "/nonexistent/client.toml"]);
        let err = build_pipeline_config(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}

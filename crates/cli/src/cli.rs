//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Compression;
use std::path::PathBuf;

/// streamcast - Stream delimited records from stdin to a topic
#[derive(Parser, Debug)]
#[command(
    name = "streamcast",
    author,
    version,
    about = "Produce delimited records from stdin to a topic",
    long_about = "Reads an unbounded byte stream from stdin, splits it into records on a \n\
                  configurable delimiter and hands each record to a delivery client \n\
                  without waiting for individual deliveries."
)]
pub struct Cli {
    /// Increase logging verbosity (--log-verbose for debug, twice for trace)
    #[arg(long, action = clap::ArgAction::Count, global = true, env = "STREAMCAST_LOG_VERBOSE")]
    pub log_verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "log_verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "STREAMCAST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Produce records read from stdin to a topic
    Produce(ProduceArgs),

    /// Validate client configuration and delimiters without producing
    Validate(ValidateArgs),
}

/// Arguments for the `produce` command
#[derive(Parser, Debug, Clone)]
pub struct ProduceArgs {
    /// Destination topic
    pub topic: String,

    /// Record delimiter (supports \t \n \r \xHH escapes)
    #[arg(short = 'D', long, default_value = "\\n", env = "STREAMCAST_DELIM")]
    pub delim: String,

    /// Key/value delimiter; enables key/value mode and overrides --delim
    #[arg(short = 'K', long)]
    pub keyed_record_delim: Option<String>,

    /// Print each successful delivery
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum bytes buffered while looking for a delimiter
    #[arg(long, default_value = "65536", env = "STREAMCAST_MAX_READ_BUF")]
    pub max_read_buf: usize,

    /// Compression codec forwarded to the delivery client
    #[arg(short = 'z', long, default_value = "snappy", env = "STREAMCAST_COMPRESSION")]
    pub compression: Compression,

    /// Delivery client configuration file (TOML or JSON); default: log client
    #[arg(short, long, env = "STREAMCAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Client parameter override as key=value (repeatable)
    #[arg(short = 'X', long = "client-opt", value_name = "KEY=VALUE")]
    pub client_opts: Vec<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "STREAMCAST_METRICS_PORT")]
    pub metrics_port: u16,
}

impl ProduceArgs {
    /// Delimiter spec in effect and whether records are keyed
    pub fn delimiter_spec(&self) -> (&str, bool) {
        match self.keyed_record_delim {
            Some(ref spec) => (spec.as_str(), true),
            None => (self.delim.as_str(), false),
        }
    }
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Record delimiter to check
    #[arg(short = 'D', long, default_value = "\\n")]
    pub delim: String,

    /// Key/value delimiter to check
    #[arg(short = 'K', long)]
    pub keyed_record_delim: Option<String>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

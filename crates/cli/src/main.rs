//! # streamcast CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - stdin → 分隔符切分 → 投递客户端
//! - 任一致命错误时以退出码 1 结束

mod cli;
mod commands;
mod pipeline;

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::debug;

use cli::{Cli, Commands};
use commands::{run_produce, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        "streamcast starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Produce(args) => run_produce(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        // A pending stdin read would block runtime shutdown, so skip it
        let _ = std::io::stdout().flush();
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(ObservabilityConfig::from_verbosity(
        cli.log_format.into(),
        cli.quiet,
        cli.log_verbose,
    ))
}

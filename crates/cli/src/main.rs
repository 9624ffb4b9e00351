//! # fakesearch CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Plan loading and validation
//! - Repeated search sessions with per-run reporting
//! - Graceful shutdown handling

mod cli;
mod commands;
mod error;
mod plan;
mod session;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_search, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "fakesearch starting");

    let result = match &cli.command {
        Commands::Run(args) => run_search(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
///
/// The Prometheus exporter is installed later by `run`, only when asked for.
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
        span_timings: !cli.quiet,
    })
}

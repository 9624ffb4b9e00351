//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{MissedDeadlinePolicy, StrategyKind};
use std::path::PathBuf;

/// fakesearch - replicated, time-bounded fan-out/fan-in search
#[derive(Parser, Debug)]
#[command(
    name = "fakesearch",
    author,
    version,
    about = "Replicated fan-out/fan-in search dispatcher",
    long_about = "Sends one query to several simulated search backends (web, image, video, ...) \n\
                  and collects their answers in arrival order under a global deadline, \n\
                  optionally racing replicas of each backend."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FAKESEARCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all log output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FAKESEARCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run searches
    Run(RunArgs),

    /// Validate a plan file without running
    Validate(ValidateArgs),

    /// Display plan information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to plan file (TOML or JSON); built-in plan if omitted
    #[arg(short, long, env = "FAKESEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the query text
    #[arg(long, env = "FAKESEARCH_QUERY")]
    pub query: Option<String>,

    /// Override the aggregation strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override the global deadline in milliseconds
    #[arg(long, conflicts_with = "no_timeout")]
    pub timeout_ms: Option<u64>,

    /// Wait for every category, however long it takes
    #[arg(long)]
    pub no_timeout: bool,

    /// What to report for categories that missed the deadline
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Cancel backend calls whose answer is no longer wanted
    #[arg(long)]
    pub cancel_stragglers: bool,

    /// Number of searches to run
    #[arg(
        short = 'n',
        long,
        default_value = "1",
        value_parser = clap::value_parser!(u32).range(1..),
        env = "FAKESEARCH_ITERATIONS"
    )]
    pub iterations: u32,

    /// Prometheus exporter port (disabled if omitted)
    #[arg(long, env = "FAKESEARCH_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Resolve the plan, print it and exit without searching
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to plan file to validate
    #[arg(short, long, default_value = "search.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to plan file; built-in plan if omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Aggregation strategy
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// One category after another
    #[value(alias = "v1")]
    Sequential,
    /// Concurrent, wait for all
    #[value(name = "fan_in", aliases = ["fan-in", "v2"])]
    FanIn,
    /// Concurrent, bounded by the deadline
    #[value(alias = "v3")]
    Bounded,
    /// Concurrent with replica races, bounded by the deadline
    #[value(alias = "v4")]
    Replicated,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Sequential => StrategyKind::Sequential,
            StrategyArg::FanIn => StrategyKind::FanIn,
            StrategyArg::Bounded => StrategyKind::Bounded,
            StrategyArg::Replicated => StrategyKind::Replicated,
        }
    }
}

/// Missed-deadline policy
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Drop missing categories
    Truncate,
    /// Report `timed-out` for each missing category
    Sentinel,
}

impl From<PolicyArg> for MissedDeadlinePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Truncate => MissedDeadlinePolicy::Truncate,
            PolicyArg::Sentinel => MissedDeadlinePolicy::Sentinel,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

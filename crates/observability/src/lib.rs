//! # Observability
//!
//! Tracing + Prometheus metrics for the search dispatcher.
//!
//! - Log lines from the workspace crates at the chosen level, everything
//!   else (tokio, hyper, ...) at `warn`
//! - Span close events, so `aggregator_collect` and `replica_race` report
//!   their own busy/idle time
//! - Optional Prometheus exporter for the `fakesearch_*` series
//!
//! ```ignore
//! use observability::{metrics, ObservabilityConfig};
//!
//! observability::init_with_config(ObservabilityConfig::default())?;
//!
//! let start = Instant::now();
//! let results = run_strategy(kind, &query, &groups, &aggregator).await?;
//! metrics::record_collection(kind.as_str(), &results, start.elapsed());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_backend_latency, record_collection, record_race_winner, DispatchStatsAggregator,
    RunningStats, RunSummary, StatsSummary,
};

/// Log targets owned by this workspace
pub const WORKSPACE_TARGETS: [&str; 6] = [
    "fakesearch",
    "dispatcher",
    "backend",
    "config_loader",
    "contracts",
    "observability",
];

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Level for the workspace crates when RUST_LOG is unset
    pub default_log_level: String,
    /// Emit an event when a span closes, with its timings
    pub span_timings: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
            span_timings: true,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

/// Filter directives: `warn` globally, `level` for the workspace crates
pub fn default_directives(level: &str) -> String {
    WORKSPACE_TARGETS
        .iter()
        .fold(String::from("warn"), |mut directives, target| {
            directives.push_str(&format!(",{target}={level}"));
            directives
        })
}

/// RUST_LOG if set, otherwise the workspace directives
fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.default_log_level)))
}

/// Install the tracing subscriber and, if configured, the Prometheus exporter
///
/// Fails if a global subscriber is already installed.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let span_events = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(span_events)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_span_events(span_events).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_span_events(span_events)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config))
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        level = %config.default_log_level,
        span_timings = config.span_timings,
        "Observability initialized"
    );
    Ok(())
}

/// Install only the Prometheus exporter on `0.0.0.0:port`
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus exporter on port {port}"))?;

    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}

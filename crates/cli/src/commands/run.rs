//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::plan::{apply_overrides, load_plan, print_plan_summary};
use crate::session::{Session, SessionConfig};

/// Execute the `run` command
pub async fn run_search(args: &RunArgs) -> Result<()> {
    let plan = load_plan(args.config.as_deref())?;
    let plan = apply_overrides(plan, args)?;

    info!(
        query = %plan.query,
        strategy = %plan.strategy,
        timeout_ms = ?plan.dispatch.timeout_ms,
        categories = plan.categories.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - plan is valid, exiting");
        print_plan_summary(&plan);
        return Ok(());
    }

    if let Some(port) = args.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let session = Session::new(SessionConfig {
        plan,
        iterations: args.iterations,
        echo: true,
    });

    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = session.run() => {
            let stats = result.context("Search session failed")?;
            info!(
                runs = stats.aggregator.total_runs,
                timed_out = stats.aggregator.timed_out_runs,
                duration_secs = stats.duration.as_secs_f64(),
                "Session completed"
            );
            if args.iterations > 1 {
                stats.print_summary();
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping session...");
        }
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

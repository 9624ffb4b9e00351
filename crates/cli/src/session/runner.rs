//! Session runner.

use anyhow::Result;
use backend::BackendFactory;
use contracts::{ResultCollection, SearchPlan};
use dispatcher::{run_strategy, Aggregator, AggregatorConfig};
use tokio::time::Instant;
use tracing::{debug, info};

use super::stats::SessionStats;
use crate::error::CliError;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub plan: SearchPlan,
    pub iterations: u32,
    /// Print every collection and its elapsed time
    pub echo: bool,
}

/// Runs a plan `iterations` times
pub struct Session {
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run every iteration in order
    ///
    /// Backends are rebuilt for each iteration, so every search samples
    /// fresh latencies.
    pub async fn run(self) -> Result<SessionStats> {
        let SessionConfig {
            plan,
            iterations,
            echo,
        } = self.config;

        let aggregator = Aggregator::new(AggregatorConfig::from(plan.dispatch));
        let factory = BackendFactory::new(plan.clone());
        let mut stats = SessionStats::new(plan.strategy);
        let started = Instant::now();

        info!(
            strategy = %plan.strategy,
            iterations,
            categories = plan.categories.len(),
            "Session started"
        );

        for iteration in 1..=iterations {
            let groups = factory.build();
            let start = Instant::now();
            let results = run_strategy(plan.strategy, &plan.query, &groups, &aggregator)
                .await
                .map_err(|e| CliError::search_execution(iteration, e.to_string()))?;
            let elapsed = start.elapsed();

            debug!(
                iteration,
                answered = results.answered(),
                timed_out = results.is_timed_out(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Search finished"
            );

            if echo {
                print_iteration(iterations, iteration, &results, elapsed);
            }
            observability::record_collection(plan.strategy.as_str(), &results, elapsed);
            stats.record(&results, elapsed);
        }

        stats.duration = started.elapsed();
        stats.dispatch = aggregator.metrics().snapshot();
        Ok(stats)
    }
}

fn print_iteration(
    iterations: u32,
    iteration: u32,
    results: &ResultCollection,
    elapsed: std::time::Duration,
) {
    if iterations > 1 {
        println!("#{iteration}");
    }
    println!("{results}");
    println!("{elapsed:?}");
}

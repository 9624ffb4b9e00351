//! All Strategies Demo
//!
//! Runs the same query through the four strategies, built by hand from the
//! lower-level building blocks instead of `run_strategy`, and prints each
//! collection followed by its wall time. Latencies, the deadline and both
//! policies come from the plan.
//!
//! Run with: cargo run -p demos --bin all_strategies [plan.toml]

use std::sync::Arc;
use std::time::Duration;

use backend::{BackendStub, LatencyModel};
use config_loader::ConfigLoader;
use contracts::{ContractError, Query, SearchPlan};
use dispatcher::{sequential, Aggregator, AggregatorConfig, ReplicaSet};
use tokio::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let plan = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading search plan");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        SearchPlan::default()
    };
    let query = plan.query.clone();
    let aggregator = Aggregator::new(AggregatorConfig::from(plan.dispatch));
    let aggregator = &aggregator;

    // V1: one after another
    report("sequential", &query, |q| {
        let backends = primaries(&plan);
        async move { sequential(&q, &backends).await }
    })
    .await;

    // V2: all at once, wait for everyone
    report("fan_in", &query, |q| {
        let backends = primaries(&plan);
        async move { aggregator.collect_until(&q, &backends, None).await }
    })
    .await;

    // V3: all at once, bounded by the deadline
    report("bounded", &query, |q| {
        let backends = primaries(&plan);
        async move { aggregator.collect(&q, &backends).await }
    })
    .await;

    // V4: replicas race inside each category
    let sets = replica_sets(&plan)?;
    report("replicated", &query, |q| async move {
        aggregator.collect(&q, &sets).await
    })
    .await;

    Ok(())
}

/// One stub per category, with the category's configured latency
fn primaries(plan: &SearchPlan) -> Vec<Arc<BackendStub>> {
    plan.categories
        .iter()
        .map(|c| {
            Arc::new(BackendStub::with_latency(
                c.name.clone(),
                LatencyModel::from(c.latency),
            ))
        })
        .collect()
}

/// One racing set per category, sharing the plan's straggler policy
fn replica_sets(plan: &SearchPlan) -> Result<Vec<Arc<ReplicaSet<BackendStub>>>, ContractError> {
    plan.categories
        .iter()
        .map(|c| {
            let latency = LatencyModel::from(c.latency);
            let replicas = (0..c.replicas)
                .map(|i| Arc::new(BackendStub::with_latency(c.name.clone(), latency).as_replica(i)))
                .collect();
            let set = ReplicaSet::new(c.name.clone(), replicas)?
                .with_straggler_policy(plan.dispatch.straggler_policy);
            Ok(Arc::new(set))
        })
        .collect()
}

async fn report<F, Fut>(name: &str, query: &Query, run: F)
where
    F: FnOnce(Query) -> Fut,
    Fut: std::future::Future<Output = contracts::ResultCollection>,
{
    let start = Instant::now();
    let results = run(query.clone()).await;
    let elapsed: Duration = start.elapsed();

    println!("== {name} ==");
    println!("{results}");
    println!("{elapsed:?}");
    if results.is_timed_out() {
        println!("({} categories missed the deadline)", results.missed());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::ConfigFormat;
    use contracts::SearchResult;

    const SLOW_VIDEO: &str = r#"
[dispatch]
timeout_ms = 40
missed_policy = "sentinel"

[[categories]]
name = "web"
replicas = 2
latency = { kind = "fixed", ms = 5 }

[[categories]]
name = "video"
replicas = 3
latency = { kind = "fixed", ms = 300 }
"#;

    fn plan() -> SearchPlan {
        ConfigLoader::load_from_str(SLOW_VIDEO, ConfigFormat::Toml).unwrap()
    }

    #[test]
    fn test_stubs_use_plan_latency() {
        let plan = plan();
        let backends = primaries(&plan);
        assert_eq!(
            backends[1].latency(),
            LatencyModel::Fixed(Duration::from_millis(300))
        );

        let sets = replica_sets(&plan).unwrap();
        assert_eq!(sets[1].len(), 3);
    }

    #[tokio::test]
    async fn test_bounded_run_pads_with_sentinels() {
        let plan = plan();
        let aggregator = Aggregator::new(AggregatorConfig::from(plan.dispatch));

        let results = aggregator.collect(&plan.query, &primaries(&plan)).await;

        assert!(results.is_timed_out());
        assert_eq!(results.len(), 2);
        assert_eq!(results.entries()[1], SearchResult::TimedOut);
    }
}

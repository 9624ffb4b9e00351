//! Strategies - the four ways of running one search
//!
//! All four are configurations of the same aggregator:
//! - `Sequential`: call each category in turn, no concurrency, no deadline
//! - `FanIn`: aggregator without a deadline
//! - `Bounded`: aggregator with the configured deadline
//! - `Replicated`: like `Bounded`, but each category races its replicas

use std::sync::Arc;

use contracts::{BackendGroup, Query, ResultCollection, SearchBackend, StrategyKind};
use tracing::{info, instrument, warn};

use crate::aggregator::Aggregator;
use crate::error::DispatchError;
use crate::racer::ReplicaSet;

/// Run one search with the chosen strategy
///
/// # Errors
/// `EmptyGroup` if a category has no backend.
#[instrument(
    name = "strategy_run",
    skip(query, groups, aggregator),
    fields(query = %query, categories = groups.len())
)]
pub async fn run_strategy<S>(
    kind: StrategyKind,
    query: &Query,
    groups: &[BackendGroup<S>],
    aggregator: &Aggregator,
) -> Result<ResultCollection, DispatchError>
where
    S: SearchBackend + Send + Sync + 'static,
{
    let collection = match kind {
        StrategyKind::Sequential => {
            let primaries = primaries(kind, groups)?;
            sequential(query, &primaries).await
        }
        StrategyKind::FanIn => {
            let primaries = primaries(kind, groups)?;
            aggregator.collect_until(query, &primaries, None).await
        }
        StrategyKind::Bounded => {
            let primaries = primaries(kind, groups)?;
            aggregator.collect(query, &primaries).await
        }
        StrategyKind::Replicated => {
            let sets = groups
                .iter()
                .map(|group| {
                    ReplicaSet::from_group(group).map(|set| {
                        Arc::new(
                            set.with_straggler_policy(aggregator.config().straggler_policy)
                                .with_metrics(Arc::clone(aggregator.metrics())),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            aggregator.collect(query, &sets).await
        }
    };

    Ok(collection)
}

/// Call every backend one after another and concatenate the answers
///
/// Failed backends are skipped. There is no deadline.
pub async fn sequential<S>(query: &Query, backends: &[Arc<S>]) -> ResultCollection
where
    S: SearchBackend,
{
    let mut collection = ResultCollection::new(backends.len());
    for backend in backends {
        match backend.search(query).await {
            Ok(answer) => collection.push(answer),
            Err(e) => warn!(category = %backend.category(), error = %e, "Category failed"),
        }
    }
    info!(
        answered = collection.answered(),
        requested = backends.len(),
        "Sequential search finished"
    );
    collection
}

/// First backend of every group
fn primaries<S>(
    kind: StrategyKind,
    groups: &[BackendGroup<S>],
) -> Result<Vec<Arc<S>>, DispatchError> {
    groups
        .iter()
        .map(|group| {
            group
                .primary()
                .cloned()
                .ok_or_else(|| DispatchError::empty_group(kind.as_str(), group.category.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatorConfig;
    use backend::{BackendFactory, BackendStub, LatencyModel};
    use contracts::{Category, MissedDeadlinePolicy};
    use std::time::Duration;
    use tokio::time::Instant;

    fn group(category: &str, latencies_ms: &[u64]) -> BackendGroup<BackendStub> {
        let replicas = latencies_ms
            .iter()
            .enumerate()
            .map(|(i, ms)| {
                Arc::new(
                    BackendStub::with_latency(
                        category,
                        LatencyModel::Fixed(Duration::from_millis(*ms)),
                    )
                    .as_replica(i),
                )
            })
            .collect();
        BackendGroup::new(Category::new(category), replicas)
    }

    #[tokio::test]
    async fn test_sequential_preserves_category_order_and_sums_latency() {
        let groups = vec![group("web", &[30]), group("image", &[10]), group("video", &[20])];
        let start = Instant::now();

        let results = run_strategy(
            StrategyKind::Sequential,
            &"golang".into(),
            &groups,
            &Aggregator::default(),
        )
        .await
        .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(60));
        let order: Vec<_> = results.answers().map(|a| a.category.to_string()).collect();
        assert_eq!(order, ["web", "image", "video"]);
    }

    #[tokio::test]
    async fn test_fan_in_ignores_configured_deadline() {
        let groups = vec![group("web", &[10]), group("video", &[120])];
        let aggregator = Aggregator::new(AggregatorConfig::with_timeout(Duration::from_millis(20)));

        let results = run_strategy(StrategyKind::FanIn, &"golang".into(), &groups, &aggregator)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(!results.is_timed_out());
    }

    #[tokio::test]
    async fn test_bounded_drops_slow_category() {
        let groups = vec![group("web", &[10]), group("image", &[10]), group("video", &[200])];
        let aggregator = Aggregator::new(AggregatorConfig::with_timeout(Duration::from_millis(50)));

        let results = run_strategy(StrategyKind::Bounded, &"golang".into(), &groups, &aggregator)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.is_timed_out());
    }

    #[tokio::test]
    async fn test_replicated_rescues_slow_primary() {
        // The first replica alone would miss the deadline; the second saves the category.
        let groups = vec![group("web", &[200, 10]), group("image", &[10, 200])];
        let aggregator = Aggregator::new(AggregatorConfig {
            missed_policy: MissedDeadlinePolicy::Sentinel,
            ..AggregatorConfig::with_timeout(Duration::from_millis(80))
        });

        let results =
            run_strategy(StrategyKind::Replicated, &"golang".into(), &groups, &aggregator)
                .await
                .unwrap();

        assert_eq!(results.answered(), 2);
        assert!(!results.is_timed_out());
        assert_eq!(aggregator.metrics().races(), 2);
        let web = results.answers().find(|a| a.category == "web").unwrap();
        assert_eq!(web.replica, Some(1));
    }

    #[tokio::test]
    async fn test_empty_group_rejected() {
        let groups = vec![BackendGroup::<BackendStub>::new("web".into(), Vec::new())];

        for kind in StrategyKind::ALL {
            let err = run_strategy(kind, &"golang".into(), &groups, &Aggregator::default())
                .await
                .unwrap_err();
            match kind {
                StrategyKind::Replicated => assert!(matches!(err, DispatchError::Contract(_))),
                _ => assert!(matches!(err, DispatchError::EmptyGroup { .. })),
            }
        }
    }

    #[tokio::test]
    async fn test_factory_groups_run_under_every_strategy() {
        for kind in StrategyKind::ALL {
            let plan = contracts::SearchPlan {
                strategy: kind,
                ..Default::default()
            };
            let groups = BackendFactory::new(plan.clone()).build();
            let aggregator = Aggregator::new(plan.dispatch.into());

            let results = run_strategy(kind, &plan.query, &groups, &aggregator)
                .await
                .unwrap();

            assert!(results.len() <= 3);
            for answer in results.answers() {
                assert_eq!(answer.text, format!("{} result for \"golang\"", answer.category));
            }
        }
    }
}

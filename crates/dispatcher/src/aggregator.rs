//! Aggregator - fan-out to categories, fan-in under a deadline
//!
//! Starts every category at once and collects answers in arrival order.
//! When the deadline elapses the aggregator stops waiting and returns what
//! it has; the remaining categories are never awaited.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    DispatchSettings, MissedDeadlinePolicy, Query, ResultCollection, SearchBackend,
    StragglerPolicy,
};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::metrics::DispatchMetrics;
use crate::unit::{arrival_channel, spawn_unit};

/// Aggregator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Global deadline (None = wait for every category)
    pub timeout: Option<Duration>,
    /// Truncate or pad with sentinels
    pub missed_policy: MissedDeadlinePolicy,
    /// Leave or cancel categories that are no longer awaited
    pub straggler_policy: StragglerPolicy,
}

impl AggregatorConfig {
    /// Wait for every category, no deadline
    pub fn unbounded() -> Self {
        Self {
            timeout: None,
            ..Self::default()
        }
    }

    /// Deadline with the default policies
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from(DispatchSettings::default())
    }
}

impl From<DispatchSettings> for AggregatorConfig {
    fn from(settings: DispatchSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            missed_policy: settings.missed_policy,
            straggler_policy: settings.straggler_policy,
        }
    }
}

/// Fan-out / fan-in over categories
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
    metrics: Arc<DispatchMetrics>,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Get shared metrics
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Query every category, bounded by the configured deadline
    pub async fn collect<S>(&self, query: &Query, categories: &[Arc<S>]) -> ResultCollection
    where
        S: SearchBackend + Send + Sync + 'static,
    {
        self.collect_until(query, categories, self.config.timeout)
            .await
    }

    /// Query every category, bounded by `timeout` instead of the configured deadline
    ///
    /// A zero timeout returns immediately with whatever already arrived
    /// (normally nothing). An empty category list returns an empty
    /// collection without spawning anything.
    #[instrument(
        name = "aggregator_collect",
        skip(self, query, categories),
        fields(query = %query, categories = categories.len())
    )]
    pub async fn collect_until<S>(
        &self,
        query: &Query,
        categories: &[Arc<S>],
        timeout: Option<Duration>,
    ) -> ResultCollection
    where
        S: SearchBackend + Send + Sync + 'static,
    {
        let requested = categories.len();
        let mut collection = ResultCollection::new(requested);
        self.metrics.inc_aggregations();

        if requested == 0 {
            self.metrics.inc_completed();
            return collection;
        }

        // The deadline counts from the moment dispatching starts.
        let deadline = timeout.map(|t| Instant::now() + t);

        let cancel = CancellationToken::new();
        let _cancel_guard = (self.config.straggler_policy == StragglerPolicy::Cancel)
            .then(|| cancel.clone().drop_guard());

        let (tx, mut rx) = arrival_channel(requested);
        for (slot, backend) in categories.iter().enumerate() {
            spawn_unit(
                Arc::clone(backend),
                query.clone(),
                slot,
                tx.clone(),
                cancel.clone(),
            );
        }
        drop(tx);
        trace!("Dispatched, collecting");

        let expired = async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        let mut reported = 0;
        while reported < requested {
            tokio::select! {
                // Drain arrivals before looking at the deadline.
                biased;

                arrival = rx.recv() => {
                    let Some(arrival) = arrival else {
                        warn!(reported, requested, "All units exited before reporting");
                        break;
                    };
                    reported += 1;
                    match arrival.outcome {
                        Ok(answer) => {
                            trace!(slot = arrival.slot, category = %answer.category, "Answer collected");
                            collection.push(answer);
                        }
                        Err(e) => {
                            self.metrics.inc_failures();
                            warn!(slot = arrival.slot, error = %e, "Category failed");
                        }
                    }
                }
                () = &mut expired => {
                    debug!(
                        collected = collection.len(),
                        outstanding = requested - reported,
                        "Deadline elapsed"
                    );
                    collection.mark_timed_out();
                    break;
                }
            }
        }

        let answered = collection.answered();
        if self.config.missed_policy == MissedDeadlinePolicy::Sentinel {
            collection.fill_with_sentinels();
        }

        self.metrics.add_answers(answered as u64);
        self.metrics.add_missed((requested - answered) as u64);
        if collection.is_timed_out() {
            self.metrics.inc_timed_out();
        } else {
            self.metrics.inc_completed();
        }

        info!(
            answered,
            requested,
            outcome = ?collection.outcome(),
            "Aggregation finished"
        );
        collection
    }
}

/// Query every category and collect answers until `timeout`
///
/// Uses the truncate policy and lets stragglers run to completion.
pub async fn aggregate<S>(
    query: &Query,
    categories: &[Arc<S>],
    timeout: Option<Duration>,
) -> ResultCollection
where
    S: SearchBackend + Send + Sync + 'static,
{
    Aggregator::new(AggregatorConfig {
        timeout,
        ..AggregatorConfig::default()
    })
    .collect(query, categories)
    .await
}

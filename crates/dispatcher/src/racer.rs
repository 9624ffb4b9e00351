//! ReplicaSet - first responder wins
//!
//! Sends the same query to every replica of a category at once and keeps
//! the first successful answer. Losing replicas are either left to finish
//! (their answer is dropped) or cancelled, depending on the straggler policy.

use std::sync::Arc;

use contracts::{
    Answer, BackendGroup, Category, ContractError, Query, SearchBackend, StragglerPolicy,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::metrics::DispatchMetrics;
use crate::unit::{arrival_channel, spawn_unit};

/// Interchangeable replicas of one category, raced on every search
pub struct ReplicaSet<S> {
    category: Category,
    replicas: Vec<Arc<S>>,
    straggler_policy: StragglerPolicy,
    metrics: Option<Arc<DispatchMetrics>>,
}

impl<S> ReplicaSet<S>
where
    S: SearchBackend + Send + Sync + 'static,
{
    /// Create a replica set
    ///
    /// # Errors
    /// `EmptyReplicaSet` if `replicas` is empty.
    pub fn new(category: Category, replicas: Vec<Arc<S>>) -> Result<Self, ContractError> {
        if replicas.is_empty() {
            return Err(ContractError::empty_replica_set(category.as_str()));
        }
        Ok(Self {
            category,
            replicas,
            straggler_policy: StragglerPolicy::default(),
            metrics: None,
        })
    }

    /// Create a replica set from a backend group
    pub fn from_group(group: &BackendGroup<S>) -> Result<Self, ContractError> {
        Self::new(group.category.clone(), group.replicas.clone())
    }

    /// Set what happens to losing replicas
    pub fn with_straggler_policy(mut self, policy: StragglerPolicy) -> Self {
        self.straggler_policy = policy;
        self
    }

    /// Report races into shared metrics
    pub fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }
}

impl<S> SearchBackend for ReplicaSet<S>
where
    S: SearchBackend + Send + Sync + 'static,
{
    fn category(&self) -> &Category {
        &self.category
    }

    async fn search(&self, query: &Query) -> Result<Answer, ContractError> {
        race_replicas(
            &self.category,
            &self.replicas,
            query,
            self.straggler_policy,
            self.metrics.as_deref(),
        )
        .await
    }
}

/// Race `replicas` on `query` and return the first successful answer
///
/// Losing replicas run to completion; their answers are discarded.
///
/// # Errors
/// - `EmptyReplicaSet` if `replicas` is empty
/// - `AllReplicasFailed` if no replica produced an answer
pub async fn race<S>(query: &Query, replicas: &[Arc<S>]) -> Result<Answer, ContractError>
where
    S: SearchBackend + Send + Sync + 'static,
{
    let Some(first) = replicas.first() else {
        return Err(ContractError::empty_replica_set("<none>"));
    };
    let category = first.category().clone();
    race_replicas(
        &category,
        replicas,
        query,
        StragglerPolicy::RunToCompletion,
        None,
    )
    .await
}

#[instrument(
    name = "replica_race",
    skip(category, replicas, query, metrics),
    fields(category = %category, replicas = replicas.len())
)]
async fn race_replicas<S>(
    category: &Category,
    replicas: &[Arc<S>],
    query: &Query,
    straggler_policy: StragglerPolicy,
    metrics: Option<&DispatchMetrics>,
) -> Result<Answer, ContractError>
where
    S: SearchBackend + Send + Sync + 'static,
{
    if replicas.is_empty() {
        return Err(ContractError::empty_replica_set(category.as_str()));
    }
    if let Some(m) = metrics {
        m.inc_races();
    }

    let cancel = CancellationToken::new();
    // Also fires if this race is itself dropped mid-flight.
    let _cancel_guard = (straggler_policy == StragglerPolicy::Cancel)
        .then(|| cancel.clone().drop_guard());

    let (tx, mut rx) = arrival_channel(replicas.len());
    for (slot, replica) in replicas.iter().enumerate() {
        spawn_unit(
            Arc::clone(replica),
            query.clone(),
            slot,
            tx.clone(),
            cancel.clone(),
        );
    }
    drop(tx);

    while let Some(arrival) = rx.recv().await {
        match arrival.outcome {
            Ok(answer) => {
                debug!(winner = arrival.slot, "Replica race won");
                return Ok(answer);
            }
            Err(e) => {
                if let Some(m) = metrics {
                    m.inc_replica_failures();
                }
                warn!(replica = arrival.slot, error = %e, "Replica failed");
            }
        }
    }

    Err(ContractError::AllReplicasFailed {
        category: category.to_string(),
        attempted: replicas.len(),
    })
}

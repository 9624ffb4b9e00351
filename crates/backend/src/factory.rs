//! Backend factory
//!
//! Turns a `SearchPlan` into backend groups. Every call builds fresh stubs;
//! nothing is memoized between runs.

use std::sync::Arc;

use contracts::{BackendGroup, Category, SearchPlan, StrategyKind};
use tracing::{debug, instrument};

use crate::stub::{BackendStub, LatencyModel};

/// Create a stub for `category` with the reference latency
pub fn new_backend(category: impl Into<Category>) -> Arc<BackendStub> {
    Arc::new(BackendStub::new(category))
}

/// Builds backend groups from a plan
#[derive(Debug, Clone)]
pub struct BackendFactory {
    plan: SearchPlan,
}

impl BackendFactory {
    pub fn new(plan: SearchPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &SearchPlan {
        &self.plan
    }

    /// One group per category, in plan order
    ///
    /// The replicated strategy gets every configured replica; the other
    /// strategies only ever call one backend per category, so they get one.
    #[instrument(
        name = "backend_factory_build",
        skip(self),
        fields(categories = self.plan.categories.len(), strategy = %self.plan.strategy)
    )]
    pub fn build(&self) -> Vec<BackendGroup<BackendStub>> {
        let groups: Vec<_> = self
            .plan
            .categories
            .iter()
            .map(|config| {
                let latency = LatencyModel::from(config.latency);
                let replicas = match self.plan.strategy {
                    StrategyKind::Replicated => config.replicas,
                    _ => 1,
                };
                Self::group(config.name.clone(), replicas, latency)
            })
            .collect();

        debug!(
            replicas = groups.iter().map(|g| g.replicas.len()).sum::<usize>(),
            "Backends built"
        );
        groups
    }

    /// Build `replicas` stubs for one category
    ///
    /// A single stub is left unlabeled; several are labeled `0..replicas`.
    pub fn group(
        category: Category,
        replicas: usize,
        latency: LatencyModel,
    ) -> BackendGroup<BackendStub> {
        let stubs = if replicas == 1 {
            vec![Arc::new(BackendStub::with_latency(category.clone(), latency))]
        } else {
            (0..replicas)
                .map(|i| {
                    Arc::new(BackendStub::with_latency(category.clone(), latency).as_replica(i))
                })
                .collect()
        };
        BackendGroup::new(category, stubs)
    }
}

//! SearchBackend trait - the "given a query, produce an answer" capability
//!
//! Implemented by the simulated backend stub and by replica groups, so a
//! category can be served by one backend or by several racing replicas.

use std::sync::Arc;

use crate::{Answer, Category, ContractError, Query};

/// Search capability
///
/// Implementations may suspend (simulated latency, racing replicas) but
/// must produce at most one answer per call.
#[trait_variant::make(SearchBackend: Send)]
pub trait LocalSearchBackend {
    /// Category this backend answers for (used for logging/metrics)
    fn category(&self) -> &Category;

    /// Run the query
    ///
    /// # Errors
    /// Returns a backend failure; the aggregator treats it like a missing category.
    async fn search(&self, query: &Query) -> Result<Answer, ContractError>;
}

/// Interchangeable backends serving one category
///
/// Strategies without replica racing use only the first replica.
#[derive(Debug)]
pub struct BackendGroup<S> {
    /// Category served by every replica of the group
    pub category: Category,
    /// Replicas, in configuration order
    pub replicas: Vec<Arc<S>>,
}

impl<S> BackendGroup<S> {
    pub fn new(category: Category, replicas: Vec<Arc<S>>) -> Self {
        Self { category, replicas }
    }

    /// First replica, used when the group is not raced
    pub fn primary(&self) -> Option<&Arc<S>> {
        self.replicas.first()
    }
}

impl<S> Clone for BackendGroup<S> {
    fn clone(&self) -> Self {
        Self {
            category: self.category.clone(),
            replicas: self.replicas.clone(),
        }
    }
}

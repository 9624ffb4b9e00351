//! Backend stub
//!
//! Implements `SearchBackend`, sleeping for a simulated service time and
//! then answering with a canned result. Used in place of real search
//! services so the racer and the aggregator have latency to arbitrate.

use std::time::Duration;

use contracts::{Answer, Category, ContractError, LatencyConfig, Query, SearchBackend};
use rand::Rng;
use tracing::trace;

/// Simulated latency distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyModel {
    /// Uniform over `[min, max)`
    Uniform { min: Duration, max: Duration },
    /// Constant delay, for reproducible timing
    Fixed(Duration),
}

impl LatencyModel {
    /// The reference distribution: uniform over `[0, 100)` ms
    pub fn reference() -> Self {
        Self::Uniform {
            min: Duration::ZERO,
            max: Duration::from_millis(100),
        }
    }

    /// No delay at all
    pub fn instant() -> Self {
        Self::Fixed(Duration::ZERO)
    }

    /// Draw one delay
    ///
    /// Each call uses the calling thread's generator, so draws are
    /// independent and nothing is shared between concurrent stubs.
    pub fn sample(&self) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Uniform { min, max } => {
                if max <= min {
                    return min;
                }
                let lo = duration_nanos(min);
                let hi = duration_nanos(max);
                Duration::from_nanos(rand::rng().random_range(lo..hi))
            }
        }
    }
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self::reference()
    }
}

impl From<LatencyConfig> for LatencyModel {
    fn from(config: LatencyConfig) -> Self {
        match config {
            LatencyConfig::Uniform { min_ms, max_ms } => Self::Uniform {
                min: Duration::from_millis(min_ms),
                max: Duration::from_millis(max_ms),
            },
            LatencyConfig::Fixed { ms } => Self::Fixed(Duration::from_millis(ms)),
        }
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Simulated search backend for one category
#[derive(Debug, Clone)]
pub struct BackendStub {
    category: Category,
    replica: Option<usize>,
    latency: LatencyModel,
}

impl BackendStub {
    /// Create a stub with the reference latency distribution
    pub fn new(category: impl Into<Category>) -> Self {
        Self::with_latency(category, LatencyModel::reference())
    }

    /// Create a stub with a custom latency model
    pub fn with_latency(category: impl Into<Category>, latency: LatencyModel) -> Self {
        Self {
            category: category.into(),
            replica: None,
            latency,
        }
    }

    /// Label the stub as replica `index` of its category
    pub fn as_replica(mut self, index: usize) -> Self {
        self.replica = Some(index);
        self
    }

    pub fn replica(&self) -> Option<usize> {
        self.replica
    }

    pub fn latency(&self) -> LatencyModel {
        self.latency
    }
}

impl SearchBackend for BackendStub {
    fn category(&self) -> &Category {
        &self.category
    }

    async fn search(&self, query: &Query) -> Result<Answer, ContractError> {
        let delay = self.latency.sample();
        trace!(
            category = %self.category,
            replica = ?self.replica,
            delay_ms = delay.as_millis() as u64,
            "Backend working"
        );

        tokio::time::sleep(delay).await;

        let answer = Answer::new(self.category.clone(), query, delay);
        Ok(match self.replica {
            Some(index) => answer.with_replica(index),
            None => answer,
        })
    }
}

//! # Dispatcher
//!
//! Replicated, time-bounded fan-out/fan-in search dispatch.
//!
//! Responsibilities:
//! - Race replicas of one category, first answer wins (`ReplicaSet`, `race`)
//! - Fan out to every category and collect in arrival order under a deadline
//!   (`Aggregator`, `aggregate`)
//! - Compose both into the four search strategies (`run_strategy`)
//!
//! Units that are no longer awaited never block: they either finish and
//! drop their answer, or are cancelled when the straggler policy says so.

pub mod aggregator;
pub mod error;
pub mod metrics;
pub mod racer;
pub mod strategy;
mod unit;

pub use aggregator::{aggregate, Aggregator, AggregatorConfig};
pub use contracts::{Query, ResultCollection, SearchBackend, SearchResult};
pub use error::DispatchError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use racer::{race, ReplicaSet};
pub use strategy::{run_strategy, sequential};

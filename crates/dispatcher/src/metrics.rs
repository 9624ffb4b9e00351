//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by an aggregator and the replica sets it drives
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Aggregation calls started
    aggregations: AtomicU64,
    /// Aggregations where every category reported in time
    completed: AtomicU64,
    /// Aggregations cut short by the deadline
    timed_out: AtomicU64,
    /// Answers collected
    answers: AtomicU64,
    /// Categories without an answer (late or failed)
    missed: AtomicU64,
    /// Categories that reported a failure
    failures: AtomicU64,
    /// Replica races run
    races: AtomicU64,
    /// Replica calls that failed inside a race
    replica_failures: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregations(&self) -> u64 {
        self.aggregations.load(Ordering::Relaxed)
    }

    pub fn inc_aggregations(&self) {
        self.aggregations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn timed_out(&self) -> u64 {
        self.timed_out.load(Ordering::Relaxed)
    }

    pub fn inc_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn answers(&self) -> u64 {
        self.answers.load(Ordering::Relaxed)
    }

    pub fn add_answers(&self, n: u64) {
        self.answers.fetch_add(n, Ordering::Relaxed);
    }

    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }

    pub fn add_missed(&self, n: u64) {
        self.missed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn races(&self) -> u64 {
        self.races.load(Ordering::Relaxed)
    }

    pub fn inc_races(&self) {
        self.races.fetch_add(1, Ordering::Relaxed);
    }

    pub fn replica_failures(&self) -> u64 {
        self.replica_failures.load(Ordering::Relaxed)
    }

    pub fn inc_replica_failures(&self) {
        self.replica_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            aggregations: self.aggregations(),
            completed: self.completed(),
            timed_out: self.timed_out(),
            answers: self.answers(),
            missed: self.missed(),
            failures: self.failures(),
            races: self.races(),
            replica_failures: self.replica_failures(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub aggregations: u64,
    pub completed: u64,
    pub timed_out: u64,
    pub answers: u64,
    pub missed: u64,
    pub failures: u64,
    pub races: u64,
    pub replica_failures: u64,
}

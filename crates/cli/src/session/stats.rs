//! Session statistics.

use std::time::Duration;

use contracts::{ResultCollection, StrategyKind};
use dispatcher::MetricsSnapshot;
use observability::DispatchStatsAggregator;

/// Statistics from a session
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub strategy: StrategyKind,

    /// Wall time of the whole session
    pub duration: Duration,

    /// Per-run statistics
    pub aggregator: DispatchStatsAggregator,

    /// Dispatcher counters at the end of the session
    pub dispatch: MetricsSnapshot,
}

impl SessionStats {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            duration: Duration::ZERO,
            aggregator: DispatchStatsAggregator::new(),
            dispatch: MetricsSnapshot::default(),
        }
    }

    pub fn record(&mut self, results: &ResultCollection, elapsed: Duration) {
        self.aggregator.update(results, elapsed);
    }

    /// Searches per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.aggregator.total_runs as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Session ({}) ===", self.strategy);
        println!("Duration: {:.3}s", self.duration.as_secs_f64());
        println!("Throughput: {:.2} searches/s", self.throughput());
        println!();
        print!("{}", self.aggregator.summary());

        // Sequential runs bypass the aggregator
        if self.dispatch.aggregations > 0 {
            println!("\nDispatcher:");
            println!("  Aggregations: {}", self.dispatch.aggregations);
            println!(
                "  Completed / timed out: {} / {}",
                self.dispatch.completed, self.dispatch.timed_out
            );
            println!("  Failed categories: {}", self.dispatch.failures);
            if self.dispatch.races > 0 {
                println!(
                    "  Replica races: {} ({} replica failures)",
                    self.dispatch.races, self.dispatch.replica_failures
                );
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let mut stats = SessionStats::new(StrategyKind::Bounded);
        stats.record(&ResultCollection::new(0), Duration::from_millis(1));
        stats.record(&ResultCollection::new(0), Duration::from_millis(1));
        stats.duration = Duration::from_secs(1);

        assert!((stats.throughput() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_duration_throughput() {
        let stats = SessionStats::new(StrategyKind::Sequential);
        assert_eq!(stats.throughput(), 0.0);
    }
}

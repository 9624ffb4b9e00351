//! Dispatch metrics
//!
//! Prometheus series for races and aggregations, plus an in-memory
//! aggregator for end-of-run summaries.

use std::collections::HashMap;
use std::time::Duration;

use contracts::{Category, ResultCollection};
use metrics::{counter, gauge, histogram};

/// Record one finished aggregation
///
/// Call once per `run_strategy` with the wall time it took.
pub fn record_collection(strategy: &str, results: &ResultCollection, elapsed: Duration) {
    let outcome = if results.is_timed_out() {
        "timed_out"
    } else {
        "completed"
    };
    counter!(
        "fakesearch_aggregations_total",
        "strategy" => strategy.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "fakesearch_aggregation_latency_ms",
        "strategy" => strategy.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);

    histogram!("fakesearch_results_collected").record(results.answered() as f64);
    gauge!("fakesearch_results_last").set(results.answered() as f64);

    let missed = results.missed();
    if missed > 0 {
        counter!("fakesearch_categories_missed_total").increment(missed as u64);
    }

    for answer in results.answers() {
        record_backend_latency(&answer.category, answer.latency);
        if let Some(replica) = answer.replica {
            record_race_winner(&answer.category, replica);
        }
    }
}

/// Record which replica won a race
pub fn record_race_winner(category: &Category, replica: usize) {
    counter!(
        "fakesearch_race_winner_total",
        "category" => category.to_string(),
        "replica" => replica.to_string()
    )
    .increment(1);
}

/// Record a backend's simulated service time
pub fn record_backend_latency(category: &Category, latency: Duration) {
    histogram!(
        "fakesearch_backend_latency_ms",
        "category" => category.to_string()
    )
    .record(latency.as_secs_f64() * 1000.0);
}

/// Dispatch statistics aggregator
///
/// Aggregates per-run numbers in memory for summary output.
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    pub total_runs: u64,
    pub timed_out_runs: u64,
    pub total_missed: u64,
    pub elapsed_stats: RunningStats,
    pub results_stats: RunningStats,
    /// Answers per category
    pub category_counts: HashMap<String, u64>,
    /// Wins per (category, replica)
    pub replica_wins: HashMap<(String, usize), u64>,
}

impl DispatchStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one run into the statistics
    pub fn update(&mut self, results: &ResultCollection, elapsed: Duration) {
        self.total_runs += 1;
        if results.is_timed_out() {
            self.timed_out_runs += 1;
        }
        self.total_missed += results.missed() as u64;

        self.elapsed_stats.push(elapsed.as_secs_f64() * 1000.0);
        self.results_stats.push(results.answered() as f64);

        for answer in results.answers() {
            *self
                .category_counts
                .entry(answer.category.to_string())
                .or_insert(0) += 1;
            if let Some(replica) = answer.replica {
                *self
                    .replica_wins
                    .entry((answer.category.to_string(), replica))
                    .or_insert(0) += 1;
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_runs: self.total_runs,
            timed_out_runs: self.timed_out_runs,
            total_missed: self.total_missed,
            timeout_rate: if self.total_runs > 0 {
                self.timed_out_runs as f64 / self.total_runs as f64 * 100.0
            } else {
                0.0
            },
            elapsed_ms: StatsSummary::from(&self.elapsed_stats),
            results_per_run: StatsSummary::from(&self.results_stats),
            category_counts: self.category_counts.clone(),
            replica_wins: self.replica_wins.clone(),
        }
    }
}

/// Summary of a series of runs
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_runs: u64,
    pub timed_out_runs: u64,
    pub total_missed: u64,
    pub timeout_rate: f64,
    pub elapsed_ms: StatsSummary,
    pub results_per_run: StatsSummary,
    pub category_counts: HashMap<String, u64>,
    pub replica_wins: HashMap<(String, usize), u64>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Runs: {}", self.total_runs)?;
        writeln!(
            f,
            "Timed out: {} ({:.2}%)",
            self.timed_out_runs, self.timeout_rate
        )?;
        writeln!(f, "Categories missed: {}", self.total_missed)?;
        writeln!(f, "Elapsed (ms): {}", self.elapsed_ms)?;
        writeln!(f, "Results per run: {}", self.results_per_run)?;

        if !self.category_counts.is_empty() {
            let mut counts: Vec<_> = self.category_counts.iter().collect();
            counts.sort();
            writeln!(f, "Answers per category:")?;
            for (category, count) in counts {
                writeln!(f, "  {category}: {count}")?;
            }
        }

        if !self.replica_wins.is_empty() {
            let mut wins: Vec<_> = self.replica_wins.iter().collect();
            wins.sort();
            writeln!(f, "Race winners:")?;
            for ((category, replica), count) in wins {
                writeln!(f, "  {category}#{replica}: {count}")?;
            }
        }

        Ok(())
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

//! SearchPlan - Config Loader output
//!
//! Describes one search run: the query, the categories and their replicas,
//! simulated latency, the aggregation strategy and the deadline policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Category, Query};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete search plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlan {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Query text sent to every category
    #[serde(default = "default_query")]
    pub query: Query,

    /// Aggregation strategy
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Deadline and straggler handling
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Backend categories, in submission order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Default for SearchPlan {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            query: default_query(),
            strategy: StrategyKind::default(),
            dispatch: DispatchSettings::default(),
            categories: default_categories(),
        }
    }
}

fn default_query() -> Query {
    Query::new("golang")
}

fn default_categories() -> Vec<CategoryConfig> {
    ["web", "image", "video"]
        .into_iter()
        .map(CategoryConfig::named)
        .collect()
}

/// Aggregation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One category after another, no concurrency, no deadline
    Sequential,
    /// All categories concurrently, wait for every answer
    FanIn,
    /// All categories concurrently, bounded by the deadline
    Bounded,
    /// Like `Bounded`, but each category races its replicas
    #[default]
    Replicated,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Sequential,
        StrategyKind::FanIn,
        StrategyKind::Bounded,
        StrategyKind::Replicated,
    ];

    /// Short name, as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::FanIn => "fan_in",
            Self::Bounded => "bounded",
            Self::Replicated => "replicated",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to put in place of a category that missed the deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedDeadlinePolicy {
    /// Drop missing categories silently
    #[default]
    Truncate,
    /// Append one `timed-out` marker per missing category
    Sentinel,
}

/// What happens to units whose result is no longer wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StragglerPolicy {
    /// Let them finish; their result is discarded
    #[default]
    RunToCompletion,
    /// Signal them to stop at their next suspension point
    Cancel,
}

/// Deadline settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Global deadline in milliseconds
    ///
    /// Omitting the key means no deadline. Omitting the whole
    /// `[dispatch]` section falls back to the 80ms default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub missed_policy: MissedDeadlinePolicy,

    #[serde(default)]
    pub straggler_policy: StragglerPolicy,
}

impl DispatchSettings {
    /// Deadline as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: Some(80),
            missed_policy: MissedDeadlinePolicy::default(),
            straggler_policy: StragglerPolicy::default(),
        }
    }
}

/// One backend category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category label echoed into answers
    pub name: Category,

    /// Replica count (only used by the replicated strategy)
    #[serde(default = "default_replicas")]
    pub replicas: usize,

    /// Simulated service time
    #[serde(default)]
    pub latency: LatencyConfig,
}

impl CategoryConfig {
    /// Category with default replicas and latency
    pub fn named(name: &str) -> Self {
        Self {
            name: Category::new(name),
            replicas: default_replicas(),
            latency: LatencyConfig::default(),
        }
    }
}

fn default_replicas() -> usize {
    2
}

/// Simulated latency distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LatencyConfig {
    /// Uniform over `[min_ms, max_ms)`
    Uniform { min_ms: u64, max_ms: u64 },
    /// Always the same delay
    Fixed { ms: u64 },
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self::Uniform {
            min_ms: 0,
            max_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_matches_reference_demo() {
        let plan = SearchPlan::default();
        assert_eq!(plan.query, "golang");
        assert_eq!(plan.strategy, StrategyKind::Replicated);
        assert_eq!(plan.dispatch.timeout(), Some(Duration::from_millis(80)));
        let names: Vec<_> = plan.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["web", "image", "video"]);
    }

    #[test]
    fn test_latency_serde_tagged() {
        let json = r#"{"kind":"fixed","ms":10}"#;
        let latency: LatencyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(latency, LatencyConfig::Fixed { ms: 10 });
    }

    #[test]
    fn test_timeout_key_omitted_means_no_deadline() {
        let settings: DispatchSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.timeout(), None);

        let plan: SearchPlan = serde_json::from_str(r#"{"query":"rust"}"#).unwrap();
        assert_eq!(plan.dispatch.timeout_ms, Some(80));
    }

    #[test]
    fn test_strategy_names() {
        for kind in StrategyKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}

//! # Integration Tests
//!
//! Cross-crate tests: plan -> backends -> dispatcher -> statistics.

#[cfg(test)]
mod contract_tests {
    use contracts::{SearchResult, TIMED_OUT_MARKER};

    #[test]
    fn test_sentinel_marker_text() {
        assert_eq!(SearchResult::TimedOut.to_string(), TIMED_OUT_MARKER);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use backend::BackendFactory;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{SearchPlan, SearchResult, StrategyKind};
    use dispatcher::{run_strategy, Aggregator, AggregatorConfig};
    use observability::DispatchStatsAggregator;
    use tokio::time::Instant;

    const FIXED_PLAN: &str = r#"
query = "golang"
strategy = "replicated"

[dispatch]
timeout_ms = 80
missed_policy = "sentinel"

[[categories]]
name = "web"
replicas = 2
latency = { kind = "fixed", ms = 10 }

[[categories]]
name = "image"
replicas = 2
latency = { kind = "fixed", ms = 20 }

[[categories]]
name = "video"
replicas = 2
latency = { kind = "fixed", ms = 300 }
"#;

    fn load(content: &str) -> SearchPlan {
        ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap()
    }

    async fn run(plan: &SearchPlan) -> (contracts::ResultCollection, Duration) {
        let groups = BackendFactory::new(plan.clone()).build();
        let aggregator = Aggregator::new(AggregatorConfig::from(plan.dispatch));
        let start = Instant::now();
        let results = run_strategy(plan.strategy, &plan.query, &groups, &aggregator)
            .await
            .unwrap();
        (results, start.elapsed())
    }

    /// End-to-end: TOML plan -> BackendFactory -> replicated strategy
    ///
    /// Fast categories arrive in latency order; the slow one is replaced by
    /// a sentinel once the deadline passes.
    #[tokio::test]
    async fn test_e2e_replicated_plan_with_sentinel() {
        let plan = load(FIXED_PLAN);

        let (results, elapsed) = run(&plan).await;

        assert!(elapsed >= Duration::from_millis(80));
        assert!(elapsed < Duration::from_millis(250));
        assert!(results.is_timed_out());
        assert_eq!(results.len(), 3);
        assert_eq!(
            results.to_string(),
            "[web result for \"golang\" image result for \"golang\" timed-out]"
        );
        assert!(matches!(results.entries()[2], SearchResult::TimedOut));
    }

    #[tokio::test]
    async fn test_e2e_truncate_drops_slow_category() {
        let mut plan = load(FIXED_PLAN);
        plan.strategy = StrategyKind::Bounded;
        plan.dispatch.missed_policy = contracts::MissedDeadlinePolicy::Truncate;

        let (results, _) = run(&plan).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results.missed(), 1);
        assert!(results.iter().all(|r| r.answer().is_some()));
    }

    #[tokio::test]
    async fn test_e2e_fan_in_waits_for_everyone() {
        let mut plan = load(FIXED_PLAN);
        plan.strategy = StrategyKind::FanIn;

        let (results, elapsed) = run(&plan).await;

        assert!(elapsed >= Duration::from_millis(300));
        assert!(!results.is_timed_out());
        let order: Vec<_> = results.answers().map(|a| a.category.to_string()).collect();
        assert_eq!(order, ["web", "image", "video"]);
    }

    #[tokio::test]
    async fn test_e2e_sequential_sums_latencies() {
        let mut plan = load(FIXED_PLAN);
        plan.strategy = StrategyKind::Sequential;
        plan.categories[2].latency = contracts::LatencyConfig::Fixed { ms: 30 };

        let (results, elapsed) = run(&plan).await;

        assert!(elapsed >= Duration::from_millis(60));
        assert_eq!(results.answered(), 3);
    }

    /// The built-in plan with random latencies never exceeds its deadline
    /// by more than scheduling slack, whatever the strategy picks.
    #[tokio::test]
    async fn test_e2e_default_plan_respects_deadline() {
        let plan = SearchPlan::default();

        for _ in 0..5 {
            let (results, elapsed) = run(&plan).await;

            assert!(elapsed < Duration::from_millis(200));
            assert!(results.len() <= 3);
            for answer in results.answers() {
                assert!(answer.replica.is_some_and(|r| r < 2));
                assert_eq!(answer.text, format!("{} result for \"golang\"", answer.category));
            }
        }
    }

    #[tokio::test]
    async fn test_e2e_json_plan_and_statistics() {
        let json = ConfigLoader::to_json(&load(FIXED_PLAN)).unwrap();
        let plan = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        let mut stats = DispatchStatsAggregator::new();

        for _ in 0..3 {
            let (results, elapsed) = run(&plan).await;
            stats.update(&results, elapsed);
        }

        let summary = stats.summary();
        assert_eq!(summary.total_runs, 3);
        assert_eq!(summary.timed_out_runs, 3);
        assert_eq!(summary.total_missed, 3);
        assert_eq!(summary.category_counts.get("web"), Some(&3));
        assert_eq!(summary.category_counts.get("video"), None);
    }
}

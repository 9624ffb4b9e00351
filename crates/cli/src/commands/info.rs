//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{LatencyConfig, MissedDeadlinePolicy, SearchPlan, StragglerPolicy, StrategyKind};
use serde::Serialize;

use crate::cli::InfoArgs;
use crate::plan::{load_plan, print_plan_summary};

/// Plan info for JSON output
#[derive(Serialize)]
struct PlanInfo {
    version: String,
    query: String,
    strategy: StrategyKind,
    dispatch: DispatchInfo,
    categories: Vec<CategoryInfo>,
}

#[derive(Serialize)]
struct DispatchInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    missed_policy: MissedDeadlinePolicy,
    straggler_policy: StragglerPolicy,
}

#[derive(Serialize)]
struct CategoryInfo {
    name: String,
    /// Replicas actually spawned under this strategy
    active_replicas: usize,
    latency: LatencyConfig,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let plan = load_plan(args.config.as_deref())?;

    if args.json {
        let json = serde_json::to_string_pretty(&build_plan_info(&plan))
            .context("Failed to serialize plan info")?;
        println!("{json}");
    } else {
        print_plan_summary(&plan);
    }

    Ok(())
}

fn build_plan_info(plan: &SearchPlan) -> PlanInfo {
    PlanInfo {
        version: format!("{:?}", plan.version),
        query: plan.query.to_string(),
        strategy: plan.strategy,
        dispatch: DispatchInfo {
            timeout_ms: plan.dispatch.timeout_ms,
            missed_policy: plan.dispatch.missed_policy,
            straggler_policy: plan.dispatch.straggler_policy,
        },
        categories: plan
            .categories
            .iter()
            .map(|c| CategoryInfo {
                name: c.name.to_string(),
                active_replicas: match plan.strategy {
                    StrategyKind::Replicated => c.replicas,
                    _ => 1,
                },
                latency: c.latency,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_json_for_builtin_plan() {
        let info = build_plan_info(&SearchPlan::default());
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["query"], "golang");
        assert_eq!(json["strategy"], "replicated");
        assert_eq!(json["dispatch"]["timeout_ms"], 80);
        assert_eq!(json["categories"][0]["active_replicas"], 2);
        assert_eq!(json["categories"][0]["latency"]["kind"], "uniform");
    }

    #[test]
    fn test_single_replica_outside_replicated() {
        let plan = SearchPlan {
            strategy: StrategyKind::FanIn,
            ..Default::default()
        };
        let info = build_plan_info(&plan);
        assert!(info.categories.iter().all(|c| c.active_replicas == 1));
    }
}

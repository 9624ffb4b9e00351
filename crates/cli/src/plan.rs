//! Plan resolution: file or built-in default, then CLI overrides.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{Query, SearchPlan, StragglerPolicy};
use config_loader::ConfigLoader;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;

/// Load a plan from `path`, or fall back to the built-in one
pub fn load_plan(path: Option<&Path>) -> Result<SearchPlan> {
    let Some(path) = path else {
        info!("No config given, using built-in plan");
        return Ok(SearchPlan::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    info!(config = %path.display(), "Loading configuration");
    ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Apply `run` overrides and re-validate
pub fn apply_overrides(mut plan: SearchPlan, args: &RunArgs) -> Result<SearchPlan> {
    if let Some(ref query) = args.query {
        info!(query = %query, "Overriding query from CLI");
        plan.query = Query::new(query);
    }
    if let Some(strategy) = args.strategy {
        plan.strategy = strategy.into();
    }
    if args.no_timeout {
        plan.dispatch.timeout_ms = None;
    } else if let Some(ms) = args.timeout_ms {
        plan.dispatch.timeout_ms = Some(ms);
    }
    if let Some(policy) = args.policy {
        plan.dispatch.missed_policy = policy.into();
    }
    if args.cancel_stragglers {
        plan.dispatch.straggler_policy = StragglerPolicy::Cancel;
    }

    ConfigLoader::validate(&plan).map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(plan)
}

/// Human-readable plan summary
pub fn print_plan_summary(plan: &SearchPlan) {
    println!("\n=== Search Plan ===\n");
    println!("Query: {:?}", plan.query.as_str());
    println!("Strategy: {}", plan.strategy);
    match plan.dispatch.timeout_ms {
        Some(ms) => println!("Deadline: {ms}ms"),
        None => println!("Deadline: none"),
    }
    println!("Missed policy: {:?}", plan.dispatch.missed_policy);
    println!("Straggler policy: {:?}", plan.dispatch.straggler_policy);

    println!("\nCategories ({}):", plan.categories.len());
    for category in &plan.categories {
        println!(
            "  - {} (replicas: {}, latency: {:?})",
            category.name, category.replicas, category.latency
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, PolicyArg, StrategyArg};
    use clap::Parser;
    use contracts::{MissedDeadlinePolicy, StrategyKind};
    use std::io::Write;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(
            ["fakesearch", "run"].into_iter().chain(args.iter().copied()),
        )
        .unwrap();
        match cli.command {
            Commands::Run(args) => args,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_builtin_plan_without_config() {
        let plan = load_plan(None).unwrap();
        assert_eq!(plan.query, "golang");
        assert_eq!(plan.categories.len(), 3);
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_plan(Some(Path::new("/nonexistent/search.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_plan_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "query = \"rust\"\nstrategy = \"bounded\"").unwrap();

        let plan = load_plan(Some(file.path())).unwrap();
        assert_eq!(plan.query, "rust");
        assert_eq!(plan.strategy, StrategyKind::Bounded);
    }

    #[test]
    fn test_overrides_applied() {
        let args = run_args(&[
            "--query",
            "rust",
            "--strategy",
            "fan_in",
            "--policy",
            "sentinel",
            "--cancel-stragglers",
            "--no-timeout",
        ]);
        assert_eq!(args.strategy, Some(StrategyArg::FanIn));
        assert_eq!(args.policy, Some(PolicyArg::Sentinel));

        let plan = apply_overrides(SearchPlan::default(), &args).unwrap();
        assert_eq!(plan.query, "rust");
        assert_eq!(plan.strategy, StrategyKind::FanIn);
        assert_eq!(plan.dispatch.timeout_ms, None);
        assert_eq!(plan.dispatch.missed_policy, MissedDeadlinePolicy::Sentinel);
        assert_eq!(plan.dispatch.straggler_policy, StragglerPolicy::Cancel);
    }

    #[test]
    fn test_timeout_override() {
        let args = run_args(&["--timeout-ms", "15"]);
        let plan = apply_overrides(SearchPlan::default(), &args).unwrap();
        assert_eq!(plan.dispatch.timeout_ms, Some(15));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = run_args(&["--query", ""]);
        let err = apply_overrides(SearchPlan::default(), &args).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}

//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{SearchPlan, StrategyKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PlanSummary>,
}

#[derive(Serialize)]
struct PlanSummary {
    version: String,
    query: String,
    strategy: StrategyKind,
    timeout_ms: Option<u64>,
    category_count: usize,
    replica_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(PlanSummary {
                    version: format!("{:?}", plan.version),
                    query: plan.query.to_string(),
                    strategy: plan.strategy,
                    timeout_ms: plan.dispatch.timeout_ms,
                    category_count: plan.categories.len(),
                    replica_count: plan.categories.iter().map(|c| c.replicas).sum(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Non-fatal issues
fn collect_warnings(plan: &SearchPlan) -> Vec<String> {
    let mut warnings = Vec::new();

    if plan.strategy != StrategyKind::Replicated {
        for category in plan.categories.iter().filter(|c| c.replicas > 1) {
            warnings.push(format!(
                "Category '{}' has {} replicas but strategy '{}' only uses one",
                category.name, category.replicas, plan.strategy
            ));
        }
    }

    if plan.dispatch.timeout_ms.is_none()
        && matches!(plan.strategy, StrategyKind::Bounded | StrategyKind::Replicated)
    {
        warnings.push(format!(
            "No timeout_ms set - strategy '{}' will wait for every category",
            plan.strategy
        ));
    }

    if plan.dispatch.timeout_ms == Some(0) {
        warnings.push("timeout_ms = 0 - every search will return immediately".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Query: {:?}", summary.query);
            println!("  Strategy: {}", summary.strategy);
            match summary.timeout_ms {
                Some(ms) => println!("  Deadline: {ms}ms"),
                None => println!("  Deadline: none"),
            }
            println!("  Categories: {}", summary.category_count);
            println!("  Replicas: {}", summary.replica_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}

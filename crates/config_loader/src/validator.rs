//! Plan validation
//!
//! Rules:
//! - query not empty
//! - at least one category
//! - category names not empty and unique
//! - replicas >= 1
//! - uniform latency: min_ms < max_ms

use std::collections::HashSet;

use contracts::{ContractError, LatencyConfig, SearchPlan};

/// Validate a SearchPlan
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(plan: &SearchPlan) -> Result<(), ContractError> {
    validate_query(plan)?;
    validate_category_names(plan)?;
    validate_replicas(plan)?;
    validate_latency(plan)?;
    Ok(())
}

fn validate_query(plan: &SearchPlan) -> Result<(), ContractError> {
    if plan.query.trim().is_empty() {
        return Err(ContractError::config_validation(
            "query",
            "query cannot be empty",
        ));
    }
    Ok(())
}

/// Category names: present, non-empty, unique
fn validate_category_names(plan: &SearchPlan) -> Result<(), ContractError> {
    if plan.categories.is_empty() {
        return Err(ContractError::config_validation(
            "categories",
            "at least one category is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, category) in plan.categories.iter().enumerate() {
        if category.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("categories[{idx}].name"),
                "category name cannot be empty",
            ));
        }
        if !seen.insert(category.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("categories[name={}]", category.name),
                "duplicate category name",
            ));
        }
    }
    Ok(())
}

fn validate_replicas(plan: &SearchPlan) -> Result<(), ContractError> {
    for category in &plan.categories {
        if category.replicas == 0 {
            return Err(ContractError::config_validation(
                format!("categories[{}].replicas", category.name),
                "replicas must be >= 1",
            ));
        }
    }
    Ok(())
}

fn validate_latency(plan: &SearchPlan) -> Result<(), ContractError> {
    for category in &plan.categories {
        if let LatencyConfig::Uniform { min_ms, max_ms } = category.latency {
            if min_ms >= max_ms {
                return Err(ContractError::config_validation(
                    format!("categories[{}].latency", category.name),
                    format!("min_ms ({min_ms}) must be < max_ms ({max_ms})"),
                ));
            }
        }
    }
    Ok(())
}

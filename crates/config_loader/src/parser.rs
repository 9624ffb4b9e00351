//! Plan parsing
//!
//! Supports TOML (primary) and JSON.

use contracts::{
    Category, ConfigVersion, ContractError, LatencyConfig, MissedDeadlinePolicy, Query,
    SearchPlan, StragglerPolicy, StrategyKind,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML plan
pub fn parse_toml(content: &str) -> Result<SearchPlan, ContractError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })?;
    let tree = serde_json::to_value(table).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })?;
    build_plan(&tree, ConfigFormat::Toml)
}

/// Parse a JSON plan
pub fn parse_json(content: &str) -> Result<SearchPlan, ContractError> {
    let tree: Value = serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })?;
    build_plan(&tree, ConfigFormat::Json)
}

/// Parse according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<SearchPlan, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

/// Deserialize a syntax tree into a plan, naming the offending field on failure
fn build_plan(tree: &Value, format: ConfigFormat) -> Result<SearchPlan, ContractError> {
    SearchPlan::deserialize(tree).map_err(|e| {
        let message = match locate(tree) {
            Some(path) => format!("{format:?} plan error at '{path}': {e}"),
            None => format!("{format:?} plan error: {e}"),
        };
        ContractError::ConfigParse {
            message,
            source: Some(Box::new(e)),
        }
    })
}

/// `true` if `value` is present and not a valid `T`
fn rejects<T: DeserializeOwned>(value: Option<&Value>) -> bool {
    value.is_some_and(|v| T::deserialize(v).is_err())
}

/// Path of the first field that fails to deserialize
fn locate(tree: &Value) -> Option<String> {
    let Some(root) = tree.as_object() else {
        return Some("<root>".to_string());
    };

    if rejects::<ConfigVersion>(root.get("version")) {
        return Some("version".to_string());
    }
    if rejects::<Query>(root.get("query")) {
        return Some("query".to_string());
    }
    if rejects::<StrategyKind>(root.get("strategy")) {
        return Some("strategy".to_string());
    }

    if let Some(dispatch) = root.get("dispatch") {
        let Some(dispatch) = dispatch.as_object() else {
            return Some("dispatch".to_string());
        };
        if rejects::<Option<u64>>(dispatch.get("timeout_ms")) {
            return Some("dispatch.timeout_ms".to_string());
        }
        if rejects::<MissedDeadlinePolicy>(dispatch.get("missed_policy")) {
            return Some("dispatch.missed_policy".to_string());
        }
        if rejects::<StragglerPolicy>(dispatch.get("straggler_policy")) {
            return Some("dispatch.straggler_policy".to_string());
        }
    }

    if let Some(categories) = root.get("categories") {
        let Some(categories) = categories.as_array() else {
            return Some("categories".to_string());
        };
        for (i, category) in categories.iter().enumerate() {
            let Some(category) = category.as_object() else {
                return Some(format!("categories[{i}]"));
            };
            let name = category.get("name");
            if name.is_none() || rejects::<Category>(name) {
                return Some(format!("categories[{i}].name"));
            }
            if rejects::<usize>(category.get("replicas")) {
                return Some(format!("categories[{i}].replicas"));
            }
            if rejects::<LatencyConfig>(category.get("latency")) {
                return Some(format!("categories[{i}].latency"));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_message(result: Result<SearchPlan, ContractError>) -> String {
        match result {
            Err(ContractError::ConfigParse { message, .. }) => message,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
query = "rust"
strategy = "bounded"

[dispatch]
timeout_ms = 50
missed_policy = "sentinel"
straggler_policy = "cancel"

[[categories]]
name = "web"
replicas = 3
latency = { kind = "fixed", ms = 10 }

[[categories]]
name = "video"
"#;
        let plan = parse_toml(content).unwrap();
        assert_eq!(plan.query, "rust");
        assert_eq!(plan.strategy, StrategyKind::Bounded);
        assert_eq!(plan.dispatch.timeout_ms, Some(50));
        assert_eq!(plan.dispatch.missed_policy, MissedDeadlinePolicy::Sentinel);
        assert_eq!(plan.dispatch.straggler_policy, StragglerPolicy::Cancel);
        assert_eq!(plan.categories.len(), 2);
        assert_eq!(plan.categories[0].replicas, 3);
        assert_eq!(plan.categories[0].latency, LatencyConfig::Fixed { ms: 10 });
        assert_eq!(plan.categories[1].replicas, 2);
        assert_eq!(plan.categories[1].latency, LatencyConfig::default());
    }

    #[test]
    fn test_parse_toml_empty_uses_reference_defaults() {
        let plan = parse_toml("").unwrap();
        assert_eq!(plan.query, "golang");
        assert_eq!(plan.categories.len(), 3);
        assert_eq!(plan.dispatch.timeout_ms, Some(80));
    }

    #[test]
    fn test_parse_toml_dispatch_without_timeout_is_unbounded() {
        let content = r#"
[dispatch]
missed_policy = "truncate"
"#;
        let plan = parse_toml(content).unwrap();
        assert_eq!(plan.dispatch.timeout(), None);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "query": "golang",
            "strategy": "fan_in",
            "categories": [
                { "name": "web", "latency": { "kind": "uniform", "min_ms": 0, "max_ms": 100 } }
            ]
        }"#;
        let plan = parse_json(content).unwrap();
        assert_eq!(plan.strategy, StrategyKind::FanIn);
        assert_eq!(plan.categories[0].name, "web");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_unknown_strategy() {
        let result = parse_toml(r#"strategy = "round_robin""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_names_strategy_field() {
        let message = error_message(parse_toml(r#"strategy = "round_robin""#));
        assert!(message.contains("at 'strategy'"), "{message}");
        assert!(message.contains("round_robin"), "{message}");
    }

    #[test]
    fn test_error_names_nested_dispatch_field() {
        let content = r#"
[dispatch]
timeout_ms = "eighty"
"#;
        let message = error_message(parse_toml(content));
        assert!(message.contains("at 'dispatch.timeout_ms'"), "{message}");
    }

    #[test]
    fn test_error_names_category_index() {
        let content = r#"
[[categories]]
name = "web"

[[categories]]
name = "image"
latency = { kind = "gaussian", ms = 10 }
"#;
        let message = error_message(parse_toml(content));
        assert!(message.contains("at 'categories[1].latency'"), "{message}");
    }

    #[test]
    fn test_json_error_names_negative_replicas() {
        let content = r#"{ "categories": [ { "name": "web", "replicas": -1 } ] }"#;
        let message = error_message(parse_json(content));
        assert!(message.contains("at 'categories[0].replicas'"), "{message}");
    }

    #[test]
    fn test_json_error_names_missing_category_name() {
        let content = r#"{ "categories": [ { "name": "web" }, { "replicas": 3 } ] }"#;
        let message = error_message(parse_json(content));
        assert!(message.contains("at 'categories[1].name'"), "{message}");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}

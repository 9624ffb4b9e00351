//! # Config Loader
//!
//! Search plan loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON plan files
//! - Validate plan legality
//! - Produce a `SearchPlan`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let plan = ConfigLoader::load_from_path(Path::new("search.toml")).unwrap();
//! println!("Query: {}", plan.query);
//! ```

mod parser;
mod validator;

pub use contracts::SearchPlan;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load a plan from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a plan from a file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SearchPlan, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a plan from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<SearchPlan, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built plan (e.g. after CLI overrides)
    pub fn validate(plan: &SearchPlan) -> Result<(), ContractError> {
        validator::validate(plan)
    }

    /// Serialize a SearchPlan to a TOML string
    pub fn to_toml(plan: &SearchPlan) -> Result<String, ContractError> {
        toml::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a SearchPlan to a JSON string
    pub fn to_json(plan: &SearchPlan) -> Result<String, ContractError> {
        serde_json::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<SearchPlan, ContractError> {
        let plan = parser::parse(content, format)?;
        validator::validate(&plan)?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REPLICATED_TOML: &str = r#"
query = "golang"
strategy = "replicated"

[dispatch]
timeout_ms = 80

[[categories]]
name = "web"
replicas = 2

[[categories]]
name = "image"
replicas = 2

[[categories]]
name = "video"
replicas = 2
latency = { kind = "fixed", ms = 20 }
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(REPLICATED_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let plan = result.unwrap();
        assert_eq!(plan.query, "golang");
        assert_eq!(plan.categories.len(), 3);
    }

    #[test]
    fn test_round_trip_toml() {
        let plan = ConfigLoader::load_from_str(REPLICATED_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&plan).unwrap();
        let plan2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(plan.query, plan2.query);
        assert_eq!(plan.dispatch, plan2.dispatch);
        assert_eq!(plan.categories[2].latency, plan2.categories[2].latency);
    }

    #[test]
    fn test_round_trip_json() {
        let plan = ConfigLoader::load_from_str(REPLICATED_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&plan).unwrap();
        let plan2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(plan.strategy, plan2.strategy);
        assert_eq!(plan.categories.len(), plan2.categories.len());
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[categories]]
name = "web"

[[categories]]
name = "web"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(REPLICATED_TOML.as_bytes()).unwrap();

        let plan = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(plan.categories[0].name, "web");
    }

    #[test]
    fn test_load_from_path_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}

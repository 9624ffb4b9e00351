//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Plan file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Plan rejected after CLI overrides
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Search execution error
    #[error("Search failed at iteration {iteration}: {message}")]
    SearchExecution { iteration: u32, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn search_execution(iteration: u32, message: impl Into<String>) -> Self {
        Self::SearchExecution {
            iteration,
            message: message.into(),
        }
    }
}

//! Layered error definitions
//!
//! Categorized by source: config / dispatch / backend

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Dispatch Errors =====
    /// A replica group was built without replicas
    #[error("replica set for category '{category}' is empty")]
    EmptyReplicaSet { category: String },

    /// Every replica of a group failed
    #[error("all {attempted} replicas failed for category '{category}'")]
    AllReplicasFailed { category: String, attempted: usize },

    // ===== Backend Errors =====
    /// A backend call failed
    #[error("backend '{category}' failed: {message}")]
    BackendFailed { category: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create empty replica set error
    pub fn empty_replica_set(category: impl Into<String>) -> Self {
        Self::EmptyReplicaSet {
            category: category.into(),
        }
    }

    /// Create backend failure
    pub fn backend_failed(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendFailed {
            category: category.into(),
            message: message.into(),
        }
    }
}

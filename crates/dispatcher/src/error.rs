//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A category has no backend to call
    #[error("strategy '{strategy}' needs a backend for category '{category}', found none")]
    EmptyGroup { strategy: String, category: String },

    /// Error from the shared contracts (e.g. an empty replica set)
    #[error("dispatch error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatchError {
    /// Create an empty group error
    pub fn empty_group(strategy: impl Into<String>, category: impl Into<String>) -> Self {
        Self::EmptyGroup {
            strategy: strategy.into(),
            category: category.into(),
        }
    }
}

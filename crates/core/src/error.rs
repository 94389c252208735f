//! Core Error Types
//!
//! Errors raised while building core domain values (rate cards, proxy
//! settings). The application crate wraps these in `AppError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings that cannot be used as given
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed rate card or pricing JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Domain rule violations (duplicate roles, negative rates)
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

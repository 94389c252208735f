//! Error Handling
//!
//! Application error type wrapping the core, LLM and generation errors.

use sow_studio_core::CoreError;
use sow_studio_llm::LlmError;
use thiserror::Error;

use crate::services::generation::GenerationError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or unusable settings
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rate card and proxy errors from the core crate
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("AnythingLLM error: {0}")]
    Llm(#[from] LlmError),

    /// Timeout or cancellation of a generation request
    #[error("Generation failed: {0}")]
    Generation(GenerationError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Transport(e) => AppError::Llm(e),
            other => AppError::Generation(other),
        }
    }
}

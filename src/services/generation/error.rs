//! Generation Errors

use std::time::Duration;

use sow_studio_llm::LlmError;
use thiserror::Error;

/// Why a generation request ended without completing.
///
/// Candidate parse failures never show up here, and neither does a response
/// without any pricing document (that is a successful completion).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Network, HTTP status or stream framing failure
    #[error("Transport error: {0}")]
    Transport(#[from] LlmError),

    #[error("Generation timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    /// Request was cancelled or superseded; never reported to `on_error`
    #[error("Generation cancelled")]
    Cancelled,
}

pub type GenerationResult<T> = Result<T, GenerationError>;

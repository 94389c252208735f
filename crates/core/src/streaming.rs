//! Stream Event Types
//!
//! Backend-agnostic events produced from a chat response stream, and the
//! adapter trait that converts raw stream lines into them. Shared by the LLM
//! crate (adapter implementations) and the application crate (generator).

use serde::{Deserialize, Serialize};

/// Event decoded from one line of a chat response stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text fragment; appended to what was received so far.
    TextDelta { content: String },

    /// Complete response text; replaces everything received so far.
    TextReplace { content: String },

    /// The backend reported a failure inside the stream.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// The backend signalled the end of the response.
    Complete {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl StreamEvent {
    /// Text carried by the event, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::TextDelta { content } | StreamEvent::TextReplace { content } => {
                Some(content.as_str())
            }
            _ => None,
        }
    }
}

/// Errors that can occur during stream adaptation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AdapterError {
    /// Invalid framing that couldn't be interpreted
    InvalidFormat(String),
    /// JSON payload parsing error
    ParseError(String),
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            AdapterError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Converts backend-specific stream lines to [`StreamEvent`]s.
pub trait StreamAdapter: Send + Sync {
    /// Backend name for logging.
    fn provider_name(&self) -> &'static str;

    /// Adapt one raw line (without its trailing newline).
    ///
    /// A single input line may produce zero, one, or multiple events.
    fn adapt(&mut self, line: &str) -> Result<Vec<StreamEvent>, AdapterError>;

    /// Reset adapter state for a new stream.
    fn reset(&mut self) {}
}

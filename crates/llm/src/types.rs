//! Chat Types
//!
//! Request/target types for the AnythingLLM stream-chat API and the error
//! type shared by every transport.

use serde::{Deserialize, Serialize};

/// AnythingLLM chat mode.
///
/// `Query` answers only from embedded workspace documents; `Chat` may also
/// use the model's general knowledge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Chat,
    Query,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Chat => "chat",
            ChatMode::Query => "query",
        }
    }
}

impl std::str::FromStr for ChatMode {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(ChatMode::Chat),
            "query" => Ok(ChatMode::Query),
            other => Err(LlmError::InvalidRequest {
                message: format!("unknown chat mode '{}'", other),
            }),
        }
    }
}

/// Workspace (and optional thread) a message is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTarget {
    pub workspace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
}

impl ChatTarget {
    pub fn workspace(slug: impl Into<String>) -> Self {
        Self {
            workspace: slug.into(),
            thread: None,
        }
    }

    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = Some(thread.into());
        self
    }
}

/// One streaming chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub target: ChatTarget,
    pub message: String,
    pub mode: ChatMode,
}

impl ChatRequest {
    pub fn new(target: ChatTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
            mode: ChatMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ChatMode) -> Self {
        self.mode = mode;
        self
    }

    /// JSON body accepted by the stream-chat endpoint.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "mode": self.mode.as_str(),
        })
    }
}

/// Errors produced while talking to the chat backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LlmError {
    /// API key missing or rejected
    AuthenticationFailed { message: String },
    /// Workspace or thread does not exist
    NotFound { resource: String },
    RateLimited {
        message: String,
        retry_after: Option<u32>,
    },
    InvalidRequest { message: String },
    /// Backend reported a failure (HTTP 5xx or an in-stream abort)
    ServerError {
        message: String,
        status: Option<u16>,
    },
    /// Connection or read failure
    NetworkError { message: String },
    /// Malformed stream framing
    ParseError { message: String },
    Other { message: String },
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::AuthenticationFailed { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            LlmError::NotFound { resource } => write!(f, "Not found: {}", resource),
            LlmError::RateLimited {
                message,
                retry_after,
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "Rate limited (retry after {}s): {}", secs, message)
                } else {
                    write!(f, "Rate limited: {}", message)
                }
            }
            LlmError::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
            LlmError::ServerError { message, status } => {
                if let Some(code) = status {
                    write!(f, "Server error ({}): {}", code, message)
                } else {
                    write!(f, "Server error: {}", message)
                }
            }
            LlmError::NetworkError { message } => write!(f, "Network error: {}", message),
            LlmError::ParseError { message } => write!(f, "Parse error: {}", message),
            LlmError::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::NetworkError {
            message: err.to_string(),
        }
    }
}

pub type LlmResult<T> = Result<T, LlmError>;

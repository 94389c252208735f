//! Generation Requests

use std::time::Duration;

use sow_studio_llm::{ChatMode, ChatRequest, ChatTarget};

use super::error::GenerationError;
use super::snapshot::{GenerationOutcome, GenerationSnapshot};

pub type UpdateCallback = Box<dyn Fn(&GenerationSnapshot) + Send + Sync>;
pub type CompleteCallback = Box<dyn FnOnce(GenerationOutcome) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(GenerationError) + Send>;

/// One SOW generation request with its callbacks.
///
/// Callbacks run on the generator's task while it holds its dispatch gate.
/// They may call `start`, `cancel` or `reset` on the same generator; such
/// calls take effect before the callback returns.
pub struct GenerationRequest {
    pub(crate) chat: ChatRequest,
    pub(crate) timeout: Option<Duration>,
    pub(crate) on_update: Option<UpdateCallback>,
    pub(crate) on_complete: Option<CompleteCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl GenerationRequest {
    pub fn new(target: ChatTarget, message: impl Into<String>) -> Self {
        Self {
            chat: ChatRequest::new(target, message),
            timeout: None,
            on_update: None,
            on_complete: None,
            on_error: None,
        }
    }

    pub fn mode(mut self, mode: ChatMode) -> Self {
        self.chat.mode = mode;
        self
    }

    /// Overrides the generator's default timeout for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&GenerationSnapshot) + Send + Sync + 'static,
    {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce(GenerationOutcome) + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(GenerationError) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("chat", &self.chat)
            .field("timeout", &self.timeout)
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

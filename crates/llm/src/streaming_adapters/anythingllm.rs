//! AnythingLLM Adapter
//!
//! Handles the stream-chat response format of AnythingLLM:
//!
//! ```text
//! data: {"uuid":"...","type":"textResponseChunk","textResponse":"Hel","close":false,"error":false}
//! data: {"uuid":"...","type":"textResponseChunk","textResponse":"lo","close":true,"error":false}
//! ```
//!
//! Proxies in front of AnythingLLM sometimes forward plain text instead of
//! SSE records; such lines are passed through as text. Until the first SSE
//! line is seen, blank lines are text too (paragraph breaks).

use serde_json::Value;
use sow_studio_core::streaming::{AdapterError, StreamAdapter, StreamEvent};

/// Adapter for AnythingLLM stream-chat lines.
#[derive(Debug, Default)]
pub struct AnythingLlmAdapter {
    closed: bool,
    /// Set once a `data:` record or SSE field line has been seen
    sse: bool,
}

impl AnythingLlmAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the backend has sent a record with `close: true`.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Adapt the final line of a body that did not end with a newline.
    ///
    /// Same as [`StreamAdapter::adapt`], except that plain text is passed
    /// through without a line break the backend never sent.
    pub fn adapt_unterminated(&mut self, line: &str) -> Result<Vec<StreamEvent>, AdapterError> {
        self.adapt_line(line, false)
    }

    fn adapt_line(&mut self, input: &str, terminated: bool) -> Result<Vec<StreamEvent>, AdapterError> {
        let line = input.trim_end_matches('\r');
        if is_sse_field(line) {
            self.sse = true;
            return Ok(vec![]);
        }

        let Some(payload) = line.strip_prefix("data:") else {
            if self.sse && line.trim().is_empty() {
                return Ok(vec![]);
            }
            // Raw text fallback
            let content = if terminated {
                format!("{}\n", line)
            } else {
                line.to_string()
            };
            if content.is_empty() {
                return Ok(vec![]);
            }
            return Ok(vec![StreamEvent::TextDelta { content }]);
        };
        self.sse = true;

        let payload = payload.trim();
        if payload.is_empty() {
            return Ok(vec![]);
        }
        if payload == "[DONE]" {
            return Ok(vec![StreamEvent::Complete {
                reason: Some("done".to_string()),
            }]);
        }

        let record: Value = serde_json::from_str(payload)
            .map_err(|e| AdapterError::ParseError(format!("{} in data record: {}", e, payload)))?;
        self.adapt_record(&record)
    }

    fn adapt_record(&mut self, record: &Value) -> Result<Vec<StreamEvent>, AdapterError> {
        let obj = record.as_object().ok_or_else(|| {
            AdapterError::InvalidFormat(format!("expected a JSON object, got: {}", record))
        })?;

        let record_type = obj.get("type").and_then(Value::as_str).unwrap_or("");
        let error_text = obj
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty());

        if record_type == "abort" || error_text.is_some() {
            let message = error_text
                .map(str::to_string)
                .or_else(|| text_field(obj).map(str::to_string))
                .unwrap_or_else(|| "stream aborted by backend".to_string());
            return Ok(vec![StreamEvent::Error {
                message,
                code: Some(if record_type.is_empty() { "error" } else { record_type }.to_string()),
            }]);
        }

        let mut events = Vec::new();
        match record_type {
            "textResponse" => {
                if let Some(text) = text_field(obj) {
                    events.push(StreamEvent::TextReplace {
                        content: text.to_string(),
                    });
                }
            }
            _ => {
                if let Some(text) = text_field(obj).filter(|t| !t.is_empty()) {
                    events.push(StreamEvent::TextDelta {
                        content: text.to_string(),
                    });
                }
            }
        }

        let closes = obj.get("close").and_then(Value::as_bool).unwrap_or(false)
            || record_type == "finalizeResponseStream";
        if closes && !self.closed {
            self.closed = true;
            events.push(StreamEvent::Complete {
                reason: Some("close".to_string()),
            });
        }

        Ok(events)
    }
}

fn text_field(obj: &serde_json::Map<String, Value>) -> Option<&str> {
    obj.get("textResponse")
        .and_then(Value::as_str)
        .or_else(|| obj.get("content").and_then(Value::as_str))
}

fn is_sse_field(line: &str) -> bool {
    line.starts_with(':')
        || line.starts_with("event:")
        || line.starts_with("id:")
        || line.starts_with("retry:")
}

impl StreamAdapter for AnythingLlmAdapter {
    fn provider_name(&self) -> &'static str {
        "anythingllm"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<StreamEvent>, AdapterError> {
        self.adapt_line(input, true)
    }

    fn reset(&mut self) {
        self.closed = false;
        self.sse = false;
    }
}

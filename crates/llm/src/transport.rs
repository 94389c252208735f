//! Chat Transport
//!
//! The seam between the generator and the network: open one streaming chat
//! request and hand back the raw response body as a byte stream. Decoding the
//! body is the caller's job (see [`crate::streaming_adapters`]).

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use url::Url;

use crate::http_client::build_http_client;
use crate::types::{ChatRequest, ChatTarget, LlmError, LlmResult};
use sow_studio_core::proxy::ProxyConfig;

/// Raw response body of a streaming chat request.
pub type ChatByteStream = BoxStream<'static, LlmResult<Bytes>>;

/// Opens streaming chat requests.
///
/// Dropping the returned stream aborts the underlying request.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Send `request` and return the response body once headers arrive.
    ///
    /// Non-success statuses are mapped through [`parse_http_error`].
    async fn open_stream(&self, request: &ChatRequest) -> LlmResult<ChatByteStream>;
}

/// Connection settings for an AnythingLLM instance.
#[derive(Debug, Clone)]
pub struct AnythingLlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub proxy: Option<ProxyConfig>,
}

/// AnythingLLM stream-chat over HTTP.
pub struct HttpChatTransport {
    config: AnythingLlmConfig,
    base: Url,
    client: reqwest::Client,
}

impl HttpChatTransport {
    pub fn new(config: AnythingLlmConfig) -> LlmResult<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            LlmError::InvalidRequest {
                message: format!("invalid AnythingLLM URL '{}': {}", config.base_url, e),
            }
        })?;
        let client = build_http_client(config.proxy.as_ref())?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// `{base}/api/v1/workspace/{slug}[/thread/{thread}]/stream-chat`
    pub fn endpoint(&self, target: &ChatTarget) -> LlmResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| LlmError::InvalidRequest {
                message: format!("AnythingLLM URL '{}' cannot be a base", self.base),
            })?;
            segments.pop_if_empty();
            segments.extend(["api", "v1", "workspace", target.workspace.as_str()]);
            if let Some(thread) = &target.thread {
                segments.extend(["thread", thread.as_str()]);
            }
            segments.push("stream-chat");
        }
        Ok(url)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    fn name(&self) -> &'static str {
        "anythingllm"
    }

    async fn open_stream(&self, request: &ChatRequest) -> LlmResult<ChatByteStream> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| missing_api_key_error(self.name()))?;

        if request.target.workspace.trim().is_empty() {
            return Err(LlmError::InvalidRequest {
                message: "workspace slug must not be empty".to_string(),
            });
        }

        let endpoint = self.endpoint(&request.target)?;
        tracing::debug!(
            "[AnythingLLM] POST {} (mode={})",
            endpoint,
            request.mode.as_str()
        );

        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&request.body())
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(LlmError::from))
            .boxed())
    }
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(backend: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", backend),
    }
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, backend: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", backend),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", backend),
        },
        404 => LlmError::NotFound {
            resource: if body.is_empty() {
                format!("{}: workspace or thread", backend)
            } else {
                body.to_string()
            },
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
            retry_after: None,
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

//! SOW Studio LLM
//!
//! Streaming chat plumbing for the AnythingLLM document-chat service:
//! - `ChatTransport` trait and its reqwest implementation
//! - AnythingLLM stream adapter (SSE lines -> `StreamEvent`)
//! - HTTP client factory with proxy support

pub mod http_client;
pub mod streaming_adapters;
pub mod transport;
pub mod types;

pub use http_client::build_http_client;
pub use streaming_adapters::AnythingLlmAdapter;
pub use transport::{
    missing_api_key_error, parse_http_error, AnythingLlmConfig, ChatByteStream, ChatTransport,
    HttpChatTransport,
};
pub use types::*;

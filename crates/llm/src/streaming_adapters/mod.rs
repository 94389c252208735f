//! Backend-Specific Stream Adapters
//!
//! Each adapter handles the streaming format of one chat backend.

pub mod anythingllm;

pub use anythingllm::AnythingLlmAdapter;

//! SOW Studio
//!
//! Streaming Statement of Work generation on top of AnythingLLM. It includes:
//! - Pricing extraction from streamed AI responses
//! - The generation state machine with monotonic progress reporting
//! - Configuration storage and CLI command handlers

pub mod commands;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::extraction::{extract, strip_document_spans, ExtractionResult};
pub use services::generation::{
    GenerationError, GenerationOutcome, GenerationRequest, GenerationSnapshot, SowGenerator,
};
pub use storage::config::ConfigService;
pub use utils::error::{AppError, AppResult};

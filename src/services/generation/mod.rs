//! SOW Generation
//!
//! Streams one AnythingLLM response, tracks the latest pricing document and
//! a monotonic progress signal, and reports a final outcome, error or
//! cancellation.

pub mod error;
pub mod machine;
pub mod progress;
pub mod request;
pub mod snapshot;

pub use error::{GenerationError, GenerationResult};
pub use machine::SowGenerator;
pub use progress::{derive_progress, progress_message, Phase, Progress, ProgressTracker};
pub use request::GenerationRequest;
pub use snapshot::{GenerationOutcome, GenerationSnapshot, GenerationStatus};

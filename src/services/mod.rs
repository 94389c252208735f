//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod extraction;
pub mod generation;
pub mod pricing;

pub use extraction::StreamExtractor;
pub use generation::SowGenerator;

//! Data Models
//!
//! Configuration data structures.

pub mod settings;

pub use settings::*;

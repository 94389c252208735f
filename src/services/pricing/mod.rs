//! Pricing Helpers
//!
//! Prompt-side pricing utilities. The arithmetic itself lives in
//! `sow_studio_core::finance`.

pub mod discount;

pub use discount::extract_discount_from_prompt;

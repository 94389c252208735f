//! SOW Studio Core
//!
//! Foundational types for the SOW Studio workspace: the pricing document
//! model, rate card, financial arithmetic, stream event types and shared
//! error types. This crate has no dependency on networking or application
//! code.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `pricing` - Pricing document model (`PricingDocument`, `Scope`, `RoleAllocation`)
//! - `rate_card` - Authoritative role rates and exact-match lookup
//! - `finance` - GST, discounts, commercial rounding and currency formatting
//! - `proxy` - Proxy configuration data types shared across workspace crates
//! - `streaming` - Stream event types and adapter trait

pub mod error;
pub mod finance;
pub mod pricing;
pub mod proxy;
pub mod rate_card;
pub mod streaming;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Pricing Model ──────────────────────────────────────────────────────
pub use pricing::{PricingDocument, RoleAllocation, Scope};

// ── Rate Card ──────────────────────────────────────────────────────────
pub use rate_card::{RateCard, RateCardEntry, RateCardLookup, UnknownRole};

// ── Finance ────────────────────────────────────────────────────────────
pub use finance::{FinancialBreakdown, FormatOptions, PricingRow};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::{AdapterError, StreamAdapter, StreamEvent};

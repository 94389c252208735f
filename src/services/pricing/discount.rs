//! Prompt Discount Extraction
//!
//! Reads a requested discount ("discount 4 percent", "10% off", ...) out of a
//! user prompt so it can be stated explicitly to the AI instead of being
//! left to its interpretation.

use std::sync::OnceLock;

use regex::Regex;

const DISCOUNT_PATTERNS: [&str; 9] = [
    r"(?i)discount\s+(\d+(?:\.\d+)?)\s+percent",
    r"(?i)(\d+(?:\.\d+)?)\s*percent\s*discount",
    r"(?i)(\d+(?:\.\d+)?)\s*%\s*discount",
    r"(?i)discount\s*(?:of|:)?\s*(\d+(?:\.\d+)?)\s*%",
    r"(?i)discount\s*(?:of|:)?\s*(\d+(?:\.\d+)?)\s*percent",
    r"(?i)with\s*(?:a|an)?\s*(\d+(?:\.\d+)?)\s*(?:%|percent)\s*discount",
    r"(?i)apply\s*(?:a|an)?\s*(\d+(?:\.\d+)?)\s*(?:%|percent)\s*discount",
    r"(?i)(\d+(?:\.\d+)?)\s*percent\s*off",
    r"(?i)(\d+(?:\.\d+)?)\s*%\s*off",
];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DISCOUNT_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Discount percentage requested in `prompt`, or 0 when none is found.
///
/// The first matching pattern wins. Values above 100 are treated as
/// nonsense (0); values above 50 are capped at 50.
pub fn extract_discount_from_prompt(prompt: &str) -> f64 {
    for pattern in patterns() {
        let Some(value) = pattern
            .captures(prompt)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        else {
            continue;
        };

        if value > 100.0 {
            tracing::warn!("[Discount] Impossible discount {}% requested, using 0%", value);
            return 0.0;
        }
        if value > 50.0 {
            tracing::warn!("[Discount] High discount {}% requested, capping at 50%", value);
            return 50.0;
        }
        return value;
    }
    0.0
}

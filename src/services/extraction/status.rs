//! Status Classification
//!
//! Best-effort UI hints derived from keywords in the streamed text. These
//! are heuristics only and must never drive business logic.

use serde::{Deserialize, Serialize};

/// Coarse activity guess for the current response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Reworking numbers (budget, recalculation)
    Adjusting,
    Analyzing,
    /// At least one pricing document is present
    Proposed,
    Generating,
}

impl Activity {
    pub fn message(&self) -> &'static str {
        match self {
            Activity::Adjusting => "AI is adjusting the pricing to match your budget...",
            Activity::Analyzing => "AI is analyzing requirements and calculating pricing...",
            Activity::Proposed => "AI has generated a pricing proposal...",
            Activity::Generating => "AI is generating your SOW...",
        }
    }
}

/// Strategy for classifying response text.
pub trait StatusClassifier: Send + Sync {
    /// `None` means no status should be shown.
    fn classify(&self, text: &str, has_valid_document: bool) -> Option<Activity>;
}

/// Keyword table classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordStatusClassifier;

const ADJUSTING_KEYWORDS: [&str; 4] = ["recalculate", "too high", "over budget", "adjust"];
const ANALYZING_KEYWORDS: [&str; 2] = ["thinking", "let me"];

impl StatusClassifier for KeywordStatusClassifier {
    fn classify(&self, text: &str, has_valid_document: bool) -> Option<Activity> {
        let lower = text.to_lowercase();
        let activity = if ADJUSTING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Activity::Adjusting
        } else if ANALYZING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Activity::Analyzing
        } else if has_valid_document {
            Activity::Proposed
        } else {
            Activity::Generating
        };
        Some(activity)
    }
}

/// Classifier that never reports a status.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentStatusClassifier;

impl StatusClassifier for SilentStatusClassifier {
    fn classify(&self, _text: &str, _has_valid_document: bool) -> Option<Activity> {
        None
    }
}

const STILL_WORKING_KEYWORDS: [&str; 11] = [
    "let me",
    "i need to",
    "thinking",
    "recalculate",
    "adjust",
    "checking",
    "reconsider",
    "looking",
    "calculating",
    "wait",
    "one moment",
];

/// Whether the text reads like the AI is still deliberating.
pub fn looks_still_working(text: &str) -> bool {
    let lower = text.to_lowercase();
    STILL_WORKING_KEYWORDS.iter().any(|k| lower.contains(k))
}

//! Progress Derivation
//!
//! Maps extractor output to a coarse phase and a 0-100 progress value. The
//! bands are cosmetic; the guarantees are that progress stays at or below 90
//! until the stream ends, refining needs at least two documents, and
//! completion is exactly 100.

use serde::{Deserialize, Serialize};
use sow_studio_core::finance::{format_currency, FormatOptions};

use super::snapshot::GenerationSnapshot;
use crate::services::extraction::{looks_still_working, ExtractionResult};

/// Highest progress reported before the stream ends.
pub const MAX_STREAMING_PROGRESS: u8 = 90;

/// Generation phase. Ordered by how far along the request is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Initializing,
    Analyzing,
    Generating,
    Refining,
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Analyzing => "analyzing",
            Phase::Generating => "generating",
            Phase::Refining => "refining",
            Phase::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub phase: Phase,
    /// Percent, 0-100
    pub percent: u8,
}

impl Progress {
    pub const INITIAL: Progress = Progress {
        phase: Phase::Initializing,
        percent: 0,
    };

    pub const COMPLETE: Progress = Progress {
        phase: Phase::Complete,
        percent: 100,
    };
}

/// Phase and progress for the current accumulator.
///
/// Document bands count distinct revisions, so a document repeated verbatim
/// does not move the request into refining.
pub fn derive_progress(result: &ExtractionResult, text: &str) -> Progress {
    match result.revision_count {
        0 => {
            let length = text.chars().count();
            if length > 500 {
                Progress {
                    phase: Phase::Generating,
                    percent: 40,
                }
            } else if looks_still_working(text) {
                Progress {
                    phase: Phase::Analyzing,
                    percent: 30,
                }
            } else {
                Progress {
                    phase: Phase::Analyzing,
                    percent: (length / 10).min(30) as u8,
                }
            }
        }
        1 => Progress {
            phase: Phase::Generating,
            percent: 50,
        },
        n => {
            let revisions = (n - 2).min(3) as u8;
            Progress {
                phase: Phase::Refining,
                percent: (60 + 10 * revisions).min(MAX_STREAMING_PROGRESS),
            }
        }
    }
}

/// Keeps reported progress from moving backwards within one request.
///
/// A full-text replacement can shrink the accumulator; the tracker holds the
/// high-water mark so the UI never regresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker {
    current: Progress,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a newly derived value; returns what should be reported.
    pub fn observe(&mut self, next: Progress) -> Progress {
        self.current = Progress {
            phase: self.current.phase.max(next.phase).min(Phase::Refining),
            percent: self
                .current
                .percent
                .max(next.percent)
                .min(MAX_STREAMING_PROGRESS),
        };
        self.current
    }
}

/// User-facing line for a snapshot.
pub fn progress_message(snapshot: &GenerationSnapshot) -> String {
    if !snapshot.is_generating {
        return match snapshot.phase {
            Phase::Complete => "SOW generation complete!".to_string(),
            _ => snapshot.status_message.clone(),
        };
    }

    match snapshot.phase {
        Phase::Initializing => "Initializing AI generation...".to_string(),
        Phase::Analyzing => "AI is analyzing your requirements and preparing pricing...".to_string(),
        Phase::Generating => "AI is generating your Statement of Work...".to_string(),
        Phase::Refining => match snapshot.total_investment {
            Some(total) if total > 0.0 => format!(
                "AI is refining the pricing to match your budget (Current estimate: {})...",
                format_currency(total, FormatOptions::without_gst())
            ),
            _ => "AI is refining the pricing to match your budget...".to_string(),
        },
        Phase::Complete => "SOW generation complete!".to_string(),
    }
}

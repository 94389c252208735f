//! Generation Snapshots

use sow_studio_core::pricing::PricingDocument;
use sow_studio_core::rate_card::UnknownRole;

use super::error::GenerationError;
use super::progress::{Phase, Progress};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Generating,
    Complete,
    Errored,
    Cancelled,
}

/// Observable state of a [`super::SowGenerator`].
#[derive(Debug, Clone, Default)]
pub struct GenerationSnapshot {
    pub status: GenerationStatus,
    pub is_generating: bool,
    pub phase: Phase,
    /// Percent, 0-100
    pub progress: u8,
    pub status_message: String,
    /// Response text with pricing JSON removed
    pub prose: String,
    /// Latest valid pricing document
    pub document: Option<PricingDocument>,
    pub candidate_count: usize,
    pub total_investment: Option<f64>,
    pub error: Option<GenerationError>,
}

impl GenerationSnapshot {
    /// State right after a request is opened.
    pub fn started() -> Self {
        Self {
            status: GenerationStatus::Generating,
            is_generating: true,
            phase: Progress::INITIAL.phase,
            progress: Progress::INITIAL.percent,
            status_message: "Initializing AI generation...".to_string(),
            ..Default::default()
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            phase: self.phase,
            percent: self.progress,
        }
    }
}

/// Final result handed to `on_complete`.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub prose: String,
    /// `None` when the response carried no valid pricing document
    pub document: Option<PricingDocument>,
    pub candidate_count: usize,
    /// Full accumulated response text
    pub raw_text: String,
    /// Roles in `document` missing from the rate card
    pub unknown_roles: Vec<UnknownRole>,
}

impl GenerationOutcome {
    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn total_investment(&self) -> Option<f64> {
        self.document.as_ref().and_then(|d| d.grand_total)
    }
}

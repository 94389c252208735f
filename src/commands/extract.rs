//! Extract Command
//!
//! Runs the extractor over a saved AI response.

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use sow_studio_core::finance::{format_financial_breakdown, FormattedFinancialBreakdown};

use crate::services::extraction::{extract, strip_document_spans, ExtractionResult};
use crate::utils::error::AppResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReport {
    pub extraction: ExtractionResult,
    pub prose: String,
    /// Breakdown recomputed from the document's role rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recomputed: Option<FormattedFinancialBreakdown>,
}

/// Read a file, or stdin when `source` is `-`.
pub fn read_input(source: &str) -> AppResult<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(Path::new(source))?)
}

pub fn run_extract(text: &str) -> ExtractReport {
    let extraction = extract(text);
    let recomputed = extraction
        .latest_document
        .as_ref()
        .map(|doc| format_financial_breakdown(&doc.breakdown()));
    ExtractReport {
        prose: strip_document_spans(text),
        extraction,
        recomputed,
    }
}

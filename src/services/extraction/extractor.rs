//! Stream JSON Extractor
//!
//! Pure functions over the accumulated response text. Safe to call on every
//! chunk: the result depends only on the input.

use std::sync::Arc;

use serde::Serialize;
use sow_studio_core::pricing::PricingDocument;

use super::scanner::{fenced_blocks, merge_ranges, remove_ranges, scan};
use super::status::{Activity, KeywordStatusClassifier, StatusClassifier};

/// Outcome of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub has_valid_document: bool,
    /// Number of valid documents found in the text
    pub candidate_count: usize,
    /// Valid documents that differ from the one before them
    pub revision_count: usize,
    /// Last valid document in text order
    pub latest_document: Option<PricingDocument>,
    /// `grandTotal` of the latest document
    pub total_investment: Option<f64>,
    pub status_message: String,
    pub activity: Option<Activity>,
}

/// Extractor with a configurable status classifier.
#[derive(Clone)]
pub struct StreamExtractor {
    classifier: Arc<dyn StatusClassifier>,
}

impl Default for StreamExtractor {
    fn default() -> Self {
        Self::new(Arc::new(KeywordStatusClassifier))
    }
}

impl std::fmt::Debug for StreamExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamExtractor").finish_non_exhaustive()
    }
}

impl StreamExtractor {
    pub fn new(classifier: Arc<dyn StatusClassifier>) -> Self {
        Self { classifier }
    }

    /// Extract the latest valid pricing document from `text`. Never fails.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let mut documents: Vec<PricingDocument> =
            scan(text).into_iter().filter_map(|c| c.document).collect();

        let candidate_count = documents.len();
        let revision_count = if documents.is_empty() {
            0
        } else {
            1 + documents.windows(2).filter(|w| w[0] != w[1]).count()
        };
        let latest_document = documents.pop();
        let has_valid_document = latest_document.is_some();
        let activity = self.classifier.classify(text, has_valid_document);

        ExtractionResult {
            has_valid_document,
            candidate_count,
            revision_count,
            total_investment: latest_document.as_ref().and_then(|d| d.grand_total),
            latest_document,
            status_message: activity.map(|a| a.message().to_string()).unwrap_or_default(),
            activity,
        }
    }
}

/// [`StreamExtractor::extract`] with the default keyword classifier.
pub fn extract(text: &str) -> ExtractionResult {
    StreamExtractor::default().extract(text)
}

/// Remove JSON candidate spans and fenced code blocks, leaving the prose.
///
/// Uses the same candidate detection as [`extract`]. The result is not
/// trimmed.
pub fn strip_document_spans(text: &str) -> String {
    let spans = merge_ranges(scan(text).into_iter().map(|c| c.range));
    let without_json = remove_ranges(text, &spans);
    let fences = fenced_blocks(&without_json);
    remove_ranges(&without_json, &fences)
}

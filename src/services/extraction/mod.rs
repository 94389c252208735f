//! Pricing Extraction
//!
//! Pulls structured pricing documents out of free-text AI responses while
//! they stream in:
//! - `scanner` - balanced-span candidate detection
//! - `extractor` - latest-valid-document extraction and prose stripping
//! - `status` - pluggable UI status classification

pub mod extractor;
pub mod scanner;
pub mod status;

pub use extractor::{extract, strip_document_spans, ExtractionResult, StreamExtractor};
pub use status::{
    looks_still_working, Activity, KeywordStatusClassifier, SilentStatusClassifier,
    StatusClassifier,
};

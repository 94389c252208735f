//! Extraction Integration Tests
//!
//! Full AI-style responses through extraction, prose stripping and the
//! extract command.

use sow_studio::commands::run_extract;
use sow_studio::services::extraction::{
    extract, strip_document_spans, Activity, SilentStatusClassifier, StreamExtractor,
};
use std::sync::Arc;

use super::support::pricing_json;

#[test]
fn test_prose_then_document() {
    let text = format!("Thinking... {}", pricing_json(1100.0));
    let result = extract(&text);

    assert!(result.has_valid_document);
    assert_eq!(result.candidate_count, 1);
    assert_eq!(result.total_investment, Some(1100.0));
    assert_eq!(strip_document_spans(&text), "Thinking... ");
}

#[test]
fn test_latest_of_several_revisions_wins() {
    let text = format!(
        "First pass: {}\nThat is over budget, adjusting.\nRevised: {}",
        pricing_json(2000.0),
        pricing_json(1800.0)
    );
    let result = extract(&text);

    assert_eq!(result.candidate_count, 2);
    assert_eq!(result.total_investment, Some(1800.0));
    let document = result.latest_document.unwrap();
    assert_eq!(document.scopes[0].role_allocation[0].role, "Tech - Producer");
}

#[test]
fn test_extraction_is_idempotent() {
    let text = format!(
        "Thinking about scope.\nFirst pass: {}\nToo high, let me adjust.\nRevised: {}\nThanks!",
        pricing_json(2400.0),
        pricing_json(1900.0)
    );

    let first = extract(&text);
    let second = extract(&text);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(strip_document_spans(&text), strip_document_spans(&text));
}

#[test]
fn test_no_document_is_not_an_error() {
    let result = extract("Let me check the rate card before pricing this.");
    assert!(!result.has_valid_document);
    assert_eq!(result.candidate_count, 0);
    assert!(result.latest_document.is_none());
    assert!(result.total_investment.is_none());
}

#[test]
fn test_unfinished_document_is_ignored_until_closed() {
    let full = pricing_json(900.0);
    let partial = &full[..full.len() / 2];

    let text = format!("Here it is: {}", partial);
    assert_eq!(extract(&text).candidate_count, 0);

    let text = format!("Here it is: {}", full);
    assert_eq!(extract(&text).total_investment, Some(900.0));
}

#[test]
fn test_json_without_pricing_keys_is_skipped() {
    let text = format!(
        "Config: {{\"theme\": \"dark\"}} then {}",
        pricing_json(500.0)
    );
    let result = extract(&text);
    assert_eq!(result.candidate_count, 1);
    assert_eq!(result.total_investment, Some(500.0));
}

#[test]
fn test_fenced_document_is_stripped_from_prose() {
    let text = format!(
        "Summary below.\n```json\n{}\n```\nLet me know.",
        pricing_json(700.0)
    );
    let result = extract(&text);
    assert_eq!(result.total_investment, Some(700.0));

    let prose = strip_document_spans(&text);
    assert!(prose.contains("Summary below."));
    assert!(prose.contains("Let me know."));
    assert!(!prose.contains("grandTotal"));
}

#[test]
fn test_status_classification() {
    let text = format!("Final pricing: {}", pricing_json(1000.0));
    let result = extract(&text);
    assert_eq!(result.activity, Some(Activity::Proposed));
    assert!(!result.status_message.is_empty());

    let silent = StreamExtractor::new(Arc::new(SilentStatusClassifier));
    let result = silent.extract(&text);
    assert_eq!(result.activity, None);
    assert_eq!(result.status_message, "");
    assert_eq!(result.total_investment, Some(1000.0));
}

#[test]
fn test_extract_command_recomputes_breakdown() {
    let text = format!("Quote: {}", pricing_json(1320.0));
    let report = run_extract(&text);

    assert_eq!(report.prose, "Quote: ");
    let recomputed = report.recomputed.expect("document present");
    assert_eq!(recomputed.subtotal, "$1,200.00");
    assert_eq!(recomputed.gst, "$120.00");
}

#[test]
fn test_extract_command_without_document() {
    let report = run_extract("Nothing priced yet.");
    assert!(report.recomputed.is_none());
    assert!(!report.extraction.has_valid_document);
}

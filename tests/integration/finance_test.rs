//! Finance Integration Tests
//!
//! Breakdown arithmetic, prompt discount detection and rate cards working
//! together.

use std::io::Write;

use sow_studio::commands::{load_rate_card, render_rate_card};
use sow_studio::services::pricing::extract_discount_from_prompt;
use sow_studio_core::finance::{
    calculate_financial_breakdown, format_currency, format_financial_breakdown,
    validate_budget_compliance, ComplianceSeverity, FormatOptions, PricingRow,
};
use sow_studio_core::rate_card::RateCardLookup;
use tempfile::NamedTempFile;

// ============================================================================
// Breakdown
// ============================================================================

#[test]
fn test_prompt_discount_flows_into_breakdown() {
    let discount = extract_discount_from_prompt("hubspot integration and 2 landing pages discount 4 percent");
    assert_eq!(discount, 4.0);

    let rows = [
        PricingRow { hours: 40.0, rate: 150.0 },
        PricingRow { hours: 20.0, rate: 200.0 },
    ];
    let breakdown = calculate_financial_breakdown(&rows, discount);

    assert_eq!(breakdown.subtotal, 10000.0);
    assert!((breakdown.discount - 400.0).abs() < 1e-9);
    assert!((breakdown.subtotal_after_discount - 9600.0).abs() < 1e-9);
    assert!((breakdown.gst - 960.0).abs() < 1e-9);
    assert!((breakdown.total_before_rounding - 10560.0).abs() < 1e-9);
    assert_eq!(breakdown.grand_total, 10600.0);

    let formatted = format_financial_breakdown(&breakdown);
    assert_eq!(formatted.subtotal, "$10,000.00");
    assert_eq!(formatted.discount, "-$400.00");
    assert_eq!(formatted.gst, "$960.00");
    assert_eq!(formatted.grand_total, "$10,600.00 +GST");
    assert_eq!(
        formatted.rounding_note.as_deref(),
        Some("(Rounded up by $40.00 for commercial presentation)")
    );
}

#[test]
fn test_capped_prompt_discount() {
    let discount = extract_discount_from_prompt("project with 75% discount");
    assert_eq!(discount, 50.0);

    let breakdown = calculate_financial_breakdown(&[PricingRow { hours: 10.0, rate: 100.0 }], discount);
    assert_eq!(breakdown.subtotal_after_discount, 500.0);
    assert_eq!(breakdown.grand_total, 600.0);
}

#[test]
fn test_budget_compliance_against_breakdown() {
    let breakdown = calculate_financial_breakdown(&[PricingRow { hours: 100.0, rate: 100.0 }], 0.0);
    assert_eq!(breakdown.grand_total, 11000.0);

    let within = validate_budget_compliance(breakdown.grand_total, 11000.0, 0.02);
    assert!(within.compliant);
    assert_eq!(within.severity, ComplianceSeverity::Ok);

    let over = validate_budget_compliance(breakdown.grand_total, 10000.0, 0.02);
    assert!(!over.compliant);
    assert_eq!(over.severity, ComplianceSeverity::Error);
    assert_eq!(over.difference, 1000.0);
}

#[test]
fn test_currency_formatting() {
    assert_eq!(format_currency(1234.56, FormatOptions::default()), "$1,234.56 +GST");
    assert_eq!(format_currency(-50.0, FormatOptions::without_gst()), "-$50.00");
}

// ============================================================================
// Rate Cards
// ============================================================================

#[test]
fn test_rate_card_file_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"roles": [{{"roleName": "Tech - Producer", "hourlyRate": 120}}, {{"roleName": "Tech - Developer", "hourlyRate": 150}}]}}"#
    )
    .unwrap();

    let card = load_rate_card(file.path()).unwrap();
    assert_eq!(card.len(), 2);
    assert!(card.is_known_role("Tech - Producer"));
    assert!(!card.is_known_role("tech - producer"));

    let markdown = render_rate_card(file.path()).unwrap();
    assert!(markdown.contains("Tech - Developer"));
}

#[test]
fn test_rate_card_rejects_duplicates() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"roleName": "PM", "hourlyRate": 100}}, {{"roleName": "PM", "hourlyRate": 110}}]"#
    )
    .unwrap();

    assert!(load_rate_card(file.path()).is_err());
}

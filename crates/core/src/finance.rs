//! Financial Arithmetic & Formatting
//!
//! Single place for SOW money maths: GST, discounts, commercial rounding,
//! budget compliance and display formatting. Non-finite inputs are treated
//! as zero everywhere so a malformed AI value can never poison a total.

use serde::{Deserialize, Serialize};

/// Australian GST rate.
pub const GST_RATE: f64 = 0.10;

/// Default commercial rounding increment.
pub const DEFAULT_ROUND_TO: f64 = 100.0;

/// Maximum discount (percent) accepted without manual approval.
pub const MAX_DISCOUNT_PERCENT: f64 = 50.0;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Options for [`format_currency`].
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    pub include_gst: bool,
    pub decimals: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_gst: true,
            decimals: 2,
        }
    }
}

impl FormatOptions {
    pub fn without_gst() -> Self {
        Self {
            include_gst: false,
            ..Self::default()
        }
    }
}

/// Format an amount as `$1,234.56 +GST`.
pub fn format_currency(amount: f64, options: FormatOptions) -> String {
    let amount = finite_or_zero(amount);
    let fixed = format!("{:.*}", options.decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    let mut out = format!("{}${}", sign, grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if options.include_gst {
        out.push_str(" +GST");
    }
    out
}

/// Round to the nearest `round_to` (half away from zero).
///
/// `$12,345 -> $12,300`, `$12,350 -> $12,400`, `$99 -> $100`.
/// An invalid increment falls back to 100.
pub fn round_commercial(amount: f64, round_to: f64) -> f64 {
    let amount = finite_or_zero(amount);
    let round_to = if round_to.is_finite() && round_to > 0.0 {
        round_to
    } else {
        DEFAULT_ROUND_TO
    };
    if amount == 0.0 {
        return 0.0;
    }
    if amount < 0.0 {
        return -round_commercial(-amount, round_to);
    }
    (amount / round_to).round() * round_to
}

pub fn calculate_gst(amount: f64) -> f64 {
    finite_or_zero(amount) * GST_RATE
}

pub fn calculate_total_with_gst(amount: f64) -> f64 {
    let amount = finite_or_zero(amount);
    amount + calculate_gst(amount)
}

/// Discount amount for a percentage (5 means 5%).
pub fn calculate_discount(subtotal: f64, discount_percent: f64) -> f64 {
    finite_or_zero(subtotal) * (finite_or_zero(discount_percent) / 100.0)
}

/// Clamp a requested discount into the accepted range.
///
/// Negative or impossible (>= 100%) discounts become 0; anything above
/// [`MAX_DISCOUNT_PERCENT`] is capped.
pub fn sanitize_discount(discount_percent: f64) -> f64 {
    if !discount_percent.is_finite() || discount_percent < 0.0 || discount_percent >= 100.0 {
        0.0
    } else if discount_percent > MAX_DISCOUNT_PERCENT {
        MAX_DISCOUNT_PERCENT
    } else {
        discount_percent
    }
}

/// Minimal row shape for totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRow {
    pub hours: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialBreakdown {
    /// Sum of hours * rate
    pub subtotal: f64,
    pub discount: f64,
    pub discount_percent: f64,
    pub subtotal_after_discount: f64,
    pub gst: f64,
    pub total_before_rounding: f64,
    /// Commercially rounded total
    pub grand_total: f64,
    pub rounding_adjustment: f64,
}

pub fn calculate_financial_breakdown(rows: &[PricingRow], discount_percent: f64) -> FinancialBreakdown {
    let subtotal: f64 = rows
        .iter()
        .map(|r| finite_or_zero(r.hours) * finite_or_zero(r.rate))
        .sum();

    let discount = calculate_discount(subtotal, discount_percent);
    let subtotal_after_discount = subtotal - discount;
    let gst = calculate_gst(subtotal_after_discount);
    let total_before_rounding = subtotal_after_discount + gst;
    let grand_total = round_commercial(total_before_rounding, DEFAULT_ROUND_TO);

    FinancialBreakdown {
        subtotal,
        discount,
        discount_percent: finite_or_zero(discount_percent),
        subtotal_after_discount,
        gst,
        total_before_rounding,
        grand_total,
        rounding_adjustment: grand_total - total_before_rounding,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedFinancialBreakdown {
    pub subtotal: String,
    pub discount: String,
    pub subtotal_after_discount: String,
    pub gst: String,
    pub grand_total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding_note: Option<String>,
}

pub fn format_financial_breakdown(breakdown: &FinancialBreakdown) -> FormattedFinancialBreakdown {
    let plain = FormatOptions::without_gst();
    let discount = if breakdown.discount > 0.0 {
        format!("-{}", format_currency(breakdown.discount, plain))
    } else {
        format_currency(0.0, plain)
    };

    let rounding_note = if breakdown.rounding_adjustment.abs() >= 1.0 {
        let direction = if breakdown.rounding_adjustment > 0.0 { "up" } else { "down" };
        Some(format!(
            "(Rounded {} by ${:.2} for commercial presentation)",
            direction,
            breakdown.rounding_adjustment.abs()
        ))
    } else {
        None
    };

    FormattedFinancialBreakdown {
        subtotal: format_currency(breakdown.subtotal, plain),
        discount,
        subtotal_after_discount: format_currency(breakdown.subtotal_after_discount, plain),
        gst: format_currency(breakdown.gst, plain),
        grand_total: format_currency(breakdown.grand_total, FormatOptions::default()),
        rounding_note,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceSeverity {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetComplianceResult {
    pub compliant: bool,
    /// Fractional variance (0.05 = 5%)
    pub variance: f64,
    pub variance_percent: f64,
    /// Amount over (positive) or under (negative) budget
    pub difference: f64,
    pub message: String,
    pub severity: ComplianceSeverity,
}

/// Compare a total against a client budget. `tolerance` is fractional (0.02 = 2%).
///
/// A zero budget means no constraint.
pub fn validate_budget_compliance(
    calculated_total: f64,
    target_budget: f64,
    tolerance: f64,
) -> BudgetComplianceResult {
    let total = finite_or_zero(calculated_total);
    let budget = finite_or_zero(target_budget);
    let difference = total - budget;
    let variance = if budget > 0.0 { difference.abs() / budget } else { 0.0 };
    let variance_percent = variance * 100.0;

    let (compliant, severity, message) = if budget == 0.0 {
        (true, ComplianceSeverity::Ok, "No budget constraint specified".to_string())
    } else if variance <= tolerance {
        (
            true,
            ComplianceSeverity::Ok,
            format!("Within budget tolerance ({:.1}% variance)", variance_percent),
        )
    } else if variance <= tolerance * 2.0 {
        (
            false,
            ComplianceSeverity::Warning,
            format!(
                "Slightly over budget: {} vs target {} ({:.1}% over tolerance)",
                format_currency(total, FormatOptions::default()),
                format_currency(budget, FormatOptions::default()),
                variance_percent
            ),
        )
    } else {
        (
            false,
            ComplianceSeverity::Error,
            format!(
                "Significantly over budget: {} vs target {} ({:.1}% variance, max allowed: {:.0}%)",
                format_currency(total, FormatOptions::default()),
                format_currency(budget, FormatOptions::default()),
                variance_percent,
                tolerance * 100.0
            ),
        )
    };

    BudgetComplianceResult {
        compliant,
        variance,
        variance_percent,
        difference,
        message,
        severity,
    }
}

/// `5 -> "5%"`, `12.5 -> "12.5%"`; with `as_decimal`, `0.05 -> "5%"`.
pub fn format_percent(value: f64, as_decimal: bool) -> String {
    let value = finite_or_zero(value);
    let percent = if as_decimal { value * 100.0 } else { value };
    if percent.fract() == 0.0 {
        format!("{:.0}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

/// Parse `"$1,234.56"` or `"1234.56"`; anything unparseable is 0.
pub fn parse_currency(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Hourly rate from a total; zero or invalid hours count as one hour.
pub fn calculate_hourly_rate(total_cost: f64, hours: f64) -> f64 {
    let hours = if hours.is_finite() && hours > 0.0 { hours } else { 1.0 };
    finite_or_zero(total_cost) / hours
}

pub fn calculate_total_cost(hours: f64, rate: f64) -> f64 {
    finite_or_zero(hours) * finite_or_zero(rate)
}

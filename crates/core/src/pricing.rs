//! Pricing Document Model
//!
//! The structured pricing block an AI backend embeds in its free-text SOW
//! response: scopes, role allocations, hours, rates and totals.
//!
//! Parsing is deliberately permissive. LLM output drifts between camelCase
//! and snake_case keys, quotes numbers, and occasionally emits malformed list
//! entries; none of that may cost us an otherwise usable document. The only
//! hard requirement is structural: a non-empty string `currency` and an
//! array-typed `scopes` field.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::finance::{calculate_financial_breakdown, FinancialBreakdown, PricingRow};
use crate::rate_card::{RateCardLookup, UnknownRole};

/// Project-level pricing document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDocument {
    /// Three-letter currency code as supplied (not validated beyond presence)
    pub currency: String,
    /// Tax rate in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_rate: Option<f64>,
    pub scopes: Vec<Scope>,
    /// Project-level discount in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total_pre_gst: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<f64>,
}

/// One phase/workstream of a SOW.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub scope_name: String,
    pub scope_description: String,
    pub deliverables: Vec<String>,
    pub assumptions: Vec<String>,
    pub role_allocation: Vec<RoleAllocation>,
    /// Scope-level discount in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// A single role row in a scope's pricing table.
///
/// `cost` is expected to equal `hours * rate` but is trusted as supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAllocation {
    pub role: String,
    pub description: String,
    pub hours: f64,
    pub rate: f64,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

impl PricingDocument {
    /// Structural validity check on a raw parsed JSON value.
    pub fn is_structurally_valid(value: &Value) -> bool {
        let has_currency = matches!(value.get("currency"), Some(Value::String(s)) if !s.is_empty());
        let has_scopes = value.get("scopes").map_or(false, Value::is_array);
        has_currency && has_scopes
    }

    /// Normalize a parsed JSON value into a document.
    ///
    /// Returns `None` only when the value is not structurally valid.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !Self::is_structurally_valid(value) {
            return None;
        }
        let obj = value.as_object()?;

        let scopes = obj
            .get("scopes")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Scope::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            currency: fields::text(obj, &["currency"]),
            gst_rate: fields::number(obj, &["gstRate", "gst_rate"]),
            scopes,
            discount: fields::number(obj, &["discount", "discountPercent", "discount_percent"]),
            grand_total_pre_gst: fields::number(
                obj,
                &["grandTotalPreGst", "grand_total_pre_gst", "subtotal"],
            ),
            gst_amount: fields::number(obj, &["gstAmount", "gst_amount"]),
            grand_total: fields::number(obj, &["grandTotal", "grand_total"]),
        })
    }

    /// Iterate every role row across all scopes, in document order.
    pub fn role_rows(&self) -> impl Iterator<Item = &RoleAllocation> {
        self.scopes.iter().flat_map(|s| s.role_allocation.iter())
    }

    /// Role rows whose name fails an exact rate-card lookup.
    ///
    /// Matching is case-sensitive with no normalization: "Senior Developer"
    /// does not match "Senior Developer II" or "senior developer".
    pub fn unknown_roles(&self, rate_card: &dyn RateCardLookup) -> Vec<UnknownRole> {
        self.scopes
            .iter()
            .enumerate()
            .flat_map(|(scope_index, scope)| {
                scope
                    .role_allocation
                    .iter()
                    .filter(|row| !rate_card.is_known_role(&row.role))
                    .map(move |row| UnknownRole {
                        scope_index,
                        scope_name: scope.scope_name.clone(),
                        role: row.role.clone(),
                    })
            })
            .collect()
    }

    /// Recompute the financial breakdown from the role rows.
    ///
    /// For reconciliation display only; the AI-supplied totals stay authoritative.
    pub fn breakdown(&self) -> FinancialBreakdown {
        let rows: Vec<PricingRow> = self
            .role_rows()
            .map(|row| PricingRow {
                hours: row.hours,
                rate: row.rate,
            })
            .collect();
        calculate_financial_breakdown(&rows, self.discount.unwrap_or(0.0))
    }
}

impl<'de> Deserialize<'de> for PricingDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        PricingDocument::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom("pricing document requires a `currency` string and a `scopes` array")
        })
    }
}

impl Scope {
    /// Normalize one scope entry; non-object entries are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let role_allocation = fields::first(obj, &["roleAllocation", "role_allocation", "roles"])
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(RoleAllocation::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            scope_name: fields::text(obj, &["scopeName", "scope_name", "name"]),
            scope_description: fields::text(obj, &["scopeDescription", "scope_description", "description"]),
            deliverables: fields::text_list(obj, &["deliverables"]),
            assumptions: fields::text_list(obj, &["assumptions"]),
            role_allocation,
            discount: fields::number(obj, &["discount", "discountPercent"]),
            sub_total: fields::number(obj, &["subTotal", "subtotal", "scope_subtotal"]),
            discount_amount: fields::number(obj, &["discountAmount", "discount_amount"]),
            gst_amount: fields::number(obj, &["gstAmount", "gst_amount"]),
            total: fields::number(obj, &["total", "scope_total"]),
        })
    }
}

impl RoleAllocation {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            role: fields::text(obj, &["role", "roleName", "role_name"]),
            description: fields::text(obj, &["description"]),
            hours: fields::number(obj, &["hours"]).unwrap_or(0.0),
            rate: fields::number(obj, &["rate", "hourlyRate", "hourly_rate"]).unwrap_or(0.0),
            cost: fields::number(obj, &["cost", "total"]).unwrap_or(0.0),
            discount: fields::number(obj, &["discount"]),
        })
    }
}

/// Tolerant field accessors over a JSON object.
mod fields {
    use super::{Map, Value};

    /// First of `keys` that is present and not null.
    pub(super) fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !v.is_null())
    }

    pub(super) fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
        match first(obj, keys)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
                    .collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    pub(super) fn text(obj: &Map<String, Value>, keys: &[&str]) -> String {
        match first(obj, keys) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    pub(super) fn text_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
        match first(obj, keys) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

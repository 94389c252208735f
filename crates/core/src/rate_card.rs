//! Rate Card
//!
//! The authoritative list of billable roles and their hourly rates. Role
//! lookups are exact and case-sensitive.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One billable role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCardEntry {
    #[serde(alias = "role_name")]
    pub role_name: String,
    #[serde(alias = "hourly_rate")]
    pub hourly_rate: f64,
}

impl RateCardEntry {
    pub fn new(role_name: impl Into<String>, hourly_rate: f64) -> Self {
        Self {
            role_name: role_name.into(),
            hourly_rate,
        }
    }
}

/// A role row that failed rate-card lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownRole {
    pub scope_index: usize,
    pub scope_name: String,
    pub role: String,
}

/// Lookup interface for rate cards.
///
/// Consumers use it to flag AI-proposed roles; it never blocks extraction.
pub trait RateCardLookup: Send + Sync {
    /// Exact, case-sensitive lookup.
    fn lookup(&self, role: &str) -> Option<RateCardEntry>;

    fn is_known_role(&self, role: &str) -> bool {
        self.lookup(role).is_some()
    }
}

/// In-memory rate card.
#[derive(Debug, Clone, Default)]
pub struct RateCard {
    entries: Vec<RateCardEntry>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RateCardFile {
    List(Vec<RateCardEntry>),
    Wrapped { roles: Vec<RateCardEntry> },
}

impl RateCard {
    /// Build a rate card, rejecting duplicate roles and invalid rates.
    pub fn from_entries(entries: Vec<RateCardEntry>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.role_name.is_empty() {
                return Err(CoreError::validation(format!("rate card entry {} has no role name", i)));
            }
            if !entry.hourly_rate.is_finite() || entry.hourly_rate < 0.0 {
                return Err(CoreError::validation(format!(
                    "invalid hourly rate {} for role '{}'",
                    entry.hourly_rate, entry.role_name
                )));
            }
            if index.insert(entry.role_name.clone(), i).is_some() {
                return Err(CoreError::validation(format!(
                    "duplicate rate card role '{}'",
                    entry.role_name
                )));
            }
        }
        Ok(Self { entries, index })
    }

    /// Parse either a bare JSON array of entries or `{"roles": [...]}`.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let entries = match serde_json::from_str::<RateCardFile>(json)? {
            RateCardFile::List(entries) => entries,
            RateCardFile::Wrapped { roles } => roles,
        };
        Self::from_entries(entries)
    }

    pub fn entries(&self) -> &[RateCardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the rate card as markdown for prompt injection.
    ///
    /// Roles are sorted by name; `version` is typically the current date
    /// (`YYYY-MM-DD`).
    pub fn to_markdown(&self, version: &str) -> String {
        let mut sorted: Vec<&RateCardEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.role_name.cmp(&b.role_name));

        let mut out = String::from("# Official Rate Card (AUD/hour)\n\n");
        out.push_str("This document is the single source of truth for hourly rates across roles.\n\n");
        out.push_str("| Role | Rate (AUD/hr) |\n|---|---:|\n");
        let rows: Vec<String> = sorted
            .iter()
            .map(|e| format!("| {} | {:.2} |", e.role_name, e.hourly_rate))
            .collect();
        out.push_str(&rows.join("\n"));
        out.push_str(&format!("\n\n> Version: v{}\n\n", version));
        out.push_str("## Pricing Guidance\n");
        out.push_str("- Rates are exclusive of GST.\n");
        out.push_str("- Use these rates for project pricing and retainers unless client-approved custom rates apply.\n");
        out.push_str("- Role names must be used exactly as listed.\n");
        out
    }
}

impl RateCardLookup for RateCard {
    fn lookup(&self, role: &str) -> Option<RateCardEntry> {
        self.index.get(role).map(|&i| self.entries[i].clone())
    }
}

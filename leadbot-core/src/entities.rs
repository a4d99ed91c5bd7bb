//! Intent and entity types shared by the router and extractors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Known lead sources (expandable). Matched case-insensitively, stored
/// capitalized.
pub const KNOWN_SOURCES: &[&str] = &[
    "instagram",
    "facebook",
    "linkedin",
    "website",
    "google",
    "ads",
];

/// Valid lead status values after canonicalization.
pub const VALID_STATUSES: &[&str] = &["NEW", "IN_PROGRESS", "FOLLOW_UP", "WON", "LOST"];

/// The categorical action a transcript requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    #[serde(rename = "LEAD_CREATE")]
    LeadCreate,
    #[serde(rename = "VISIT_SCHEDULE")]
    VisitSchedule,
    #[serde(rename = "LEAD_UPDATE")]
    LeadUpdate,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LeadCreate => "LEAD_CREATE",
            Intent::VisitSchedule => "VISIT_SCHEDULE",
            Intent::LeadUpdate => "LEAD_UPDATE",
            Intent::Unknown => "UNKNOWN",
        }
    }

    /// Entities that must be present for this intent to be claimed.
    pub fn required_entities(&self) -> &'static [&'static str] {
        match self {
            Intent::LeadCreate => &["name", "phone", "city"],
            Intent::VisitSchedule => &["lead_id", "visit_time"],
            Intent::LeadUpdate => &["lead_id", "status"],
            Intent::Unknown => &[],
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted entity map. Presence/absence of a key is the contract.
pub type Entities = HashMap<String, String>;

/// Output of a single `parse` call. Fresh per call, no shared state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseResult {
    pub intent: Intent,
    pub entities: Entities,
}

impl ParseResult {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            entities: Entities::new(),
        }
    }
}

/// Capitalize a source candidate and keep it only if whitelisted.
/// Unrecognized sources are dropped, not reported.
pub fn canonical_source(candidate: &str) -> Option<String> {
    let lowered = candidate.to_lowercase();
    if !KNOWN_SOURCES.contains(&lowered.as_str()) {
        return None;
    }
    let mut chars = lowered.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Uppercase a status phrase, replace internal spaces with underscores,
/// and keep it only if whitelisted.
pub fn canonical_status(raw: &str) -> Option<String> {
    let status = raw.trim().to_uppercase().replace(' ', "_");
    if VALID_STATUSES.contains(&status.as_str()) {
        Some(status)
    } else {
        None
    }
}

//! LEAD_UPDATE extraction: lead_id, status, optional notes.

use anyhow::Result;
use regex::Regex;

use crate::entities::{canonical_status, Entities};

pub fn gate(lowered: &str) -> bool {
    ["update", "mark", "status"].iter().any(|w| lowered.contains(w))
}

pub struct LeadUpdateExtractor {
    lead_re: Regex,
    status_re: Regex,
    // Unlike the visit extractor, the colon is mandatory here.
    notes_re: Regex,
}

impl LeadUpdateExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            lead_re: Regex::new(r"lead\s+([0-9a-fA-F-]+)")?,
            status_re: Regex::new(r"(?i)(NEW|IN PROGRESS|FOLLOW UP|WON|LOST)")?,
            notes_re: Regex::new(r"(?i)notes?:\s*(.+)")?,
        })
    }

    /// `Some` only when both lead_id and a whitelisted status were found.
    pub fn extract(&self, text: &str) -> Option<Entities> {
        let mut entities = Entities::new();

        if let Some(caps) = self.lead_re.captures(text) {
            entities.insert("lead_id".to_string(), caps[1].trim().to_string());
        }

        if let Some(caps) = self.status_re.captures(text) {
            if let Some(status) = canonical_status(&caps[1]) {
                entities.insert("status".to_string(), status);
            }
        }

        if let Some(caps) = self.notes_re.captures(text) {
            entities.insert("notes".to_string(), caps[1].trim().to_string());
        }

        if entities.contains_key("lead_id") && entities.contains_key("status") {
            Some(entities)
        } else {
            None
        }
    }
}

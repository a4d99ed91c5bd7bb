//! LEAD_CREATE extraction: name, phone, city, optional whitelisted source.

use anyhow::Result;
use regex::Regex;

use crate::entities::{canonical_source, Entities};

/// Cheap keyword pre-filter. Proper extraction only runs when this passes.
pub fn gate(lowered: &str) -> bool {
    lowered.contains("lead")
        && ["add", "create", "register", "new"]
            .iter()
            .any(|w| lowered.contains(w))
}

pub struct LeadCreateExtractor {
    name_re: Regex,
    phone_re: Regex,
    city_re: Regex,
    source_re: Regex,
}

impl LeadCreateExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Two consecutive capitalized words, optionally introduced by "name".
            name_re: Regex::new(r"(?:name\s+)?([A-Z][a-z]+\s+[A-Z][a-z]+)")?,
            // Optional +91 prefix, 10 digits optionally split 5+5.
            phone_re: Regex::new(r"(\+91[-\s]?)?\d{5}[-\s]?\d{5}")?,
            city_re: Regex::new(r"(?:city\s+|from\s+)([A-Za-z]+)")?,
            source_re: Regex::new(r"(?i)(?:via|source|referral|through)\s+([A-Za-z]+)")?,
        })
    }

    /// Run against the original-case transcript. `Some` only when name,
    /// phone, and city were all found.
    pub fn extract(&self, text: &str) -> Option<Entities> {
        let mut entities = Entities::new();

        if let Some(caps) = self.name_re.captures(text) {
            entities.insert("name".to_string(), caps[1].trim().to_string());
        }

        if let Some(m) = self.phone_re.find(text) {
            let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            entities.insert("phone".to_string(), digits);
        }

        if let Some(caps) = self.city_re.captures(text) {
            entities.insert("city".to_string(), caps[1].trim().to_string());
        }

        // Unrecognized sources are dropped silently.
        if let Some(caps) = self.source_re.captures(text) {
            if let Some(source) = canonical_source(&caps[1]) {
                entities.insert("source".to_string(), source);
            }
        }

        if ["name", "phone", "city"].iter().all(|k| entities.contains_key(*k)) {
            Some(entities)
        } else {
            None
        }
    }
}

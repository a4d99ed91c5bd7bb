//! VISIT_SCHEDULE extraction: lead_id, visit_time, optional notes.
//!
//! Time phrases go through an ordered pattern list, strictest first; the
//! later entries are deliberate catch-alls for looser phrasing. Whatever
//! matches is handed to the [`TimeParser`]; when normalization fails the
//! raw matched text is kept verbatim so the caller can still see what was
//! said.

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::entities::Entities;
use crate::timeparse::{to_canonical, TimeParser};

/// Tokens the lead-id patterns must never accept as an id.
const LEAD_ID_STOPWORDS: &[&str] = &["at", "on", "for", "with", "and", "or"];

pub fn gate(lowered: &str) -> bool {
    ["visit", "appointment", "meeting", "schedule"]
        .iter()
        .any(|w| lowered.contains(w))
}

struct TimePattern {
    re: Regex,
    /// Day and clock captured separately, joined with a space.
    combine_day_time: bool,
}

pub struct VisitScheduleExtractor {
    lead_patterns: Vec<Regex>,
    time_patterns: Vec<TimePattern>,
    notes_patterns: Vec<Regex>,
}

impl VisitScheduleExtractor {
    pub fn new() -> Result<Self> {
        let time_patterns = vec![
            // ISO datetime (e.g. "2025-10-03T15:00:00")
            TimePattern {
                re: Regex::new(r"(?i)(?:at|on)\s+(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})")?,
                combine_day_time: false,
            },
            // Date with time (e.g. "2025-10-03 15:00")
            TimePattern {
                re: Regex::new(r"(?i)(?:at|on)\s+(\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2})")?,
                combine_day_time: false,
            },
            // Month name with day and time (e.g. "October 3 3 PM")
            TimePattern {
                re: Regex::new(concat!(
                    r"(?i)(?:at|on)\s+((?:January|February|March|April|May|June|July|August|",
                    r"September|October|November|December)\s+\d{1,2}\s+\d{1,2}\s*(?:AM|PM)?)"
                ))?,
                combine_day_time: false,
            },
            // Relative day with time (e.g. "tomorrow at 3 PM")
            TimePattern {
                re: Regex::new(concat!(
                    r"(?i)(tomorrow|today|monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
                    r"\s+(?:at\s+)?(\d{1,2}(?::\d{2})?\s*(?:AM|PM)?)"
                ))?,
                combine_day_time: true,
            },
            // Just a time (e.g. "at 3 PM", "at 15:00")
            TimePattern {
                re: Regex::new(r"(?i)(?:at|on)\s+(\d{1,2}(?::\d{2})?\s*(?:AM|PM)?)")?,
                combine_day_time: false,
            },
            // Bare time anywhere, last resort
            TimePattern {
                re: Regex::new(r"(?i)(\d{1,2}:\d{2}(?:\s*(?:AM|PM))?)")?,
                combine_day_time: false,
            },
        ];

        Ok(Self {
            lead_patterns: vec![
                // Long UUID-style ids first, then short alphanumeric ids.
                Regex::new(r"(?i)lead\s+([0-9a-fA-F-]{8,})")?,
                Regex::new(r"(?i)lead\s+([a-zA-Z0-9-]{3,})")?,
            ],
            time_patterns,
            notes_patterns: vec![
                Regex::new(r"(?i)notes?\s+(.+)$")?,
                Regex::new(r"(?i)notes?:\s*(.+)$")?,
            ],
        })
    }

    /// `Some` only when a lead id and some time indication were found.
    pub fn extract(
        &self,
        text: &str,
        time: &dyn TimeParser,
        now: DateTime<Utc>,
    ) -> Option<Entities> {
        let mut entities = Entities::new();

        for pattern in &self.lead_patterns {
            if let Some(caps) = pattern.captures(text) {
                let lead_id = caps[1].trim().to_string();
                if LEAD_ID_STOPWORDS.contains(&lead_id.to_lowercase().as_str()) {
                    continue;
                }
                entities.insert("lead_id".to_string(), lead_id);
                break;
            }
        }

        let mut time_text = None;
        for pattern in &self.time_patterns {
            if let Some(caps) = pattern.re.captures(text) {
                time_text = Some(if pattern.combine_day_time {
                    format!("{} {}", &caps[1], &caps[2])
                } else {
                    caps[1].trim().to_string()
                });
                break;
            }
        }

        for pattern in &self.notes_patterns {
            if let Some(caps) = pattern.captures(text) {
                entities.insert("notes".to_string(), caps[1].trim().to_string());
                break;
            }
        }

        let time_text = time_text?;
        if !entities.contains_key("lead_id") {
            return None;
        }

        let visit_time = match time.parse_phrase(&time_text, now) {
            Some(dt) => to_canonical(&dt),
            // Raw fallback: keep what was said rather than dropping it.
            None => time_text,
        };
        entities.insert("visit_time".to_string(), visit_time);

        Some(entities)
    }
}

//! Rule-based intent router.
//!
//! Trials run in fixed priority: LEAD_CREATE, then VISIT_SCHEDULE, then
//! LEAD_UPDATE. Each trial is gated by a cheap keyword check before its
//! extractor runs; a gated trial whose extraction cannot fill every
//! required entity falls through to the next one. No trial succeeding
//! means UNKNOWN with empty entities.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::entities::{Intent, ParseResult};
use crate::extractors::{
    lead_create, lead_update, visit_schedule, LeadCreateExtractor, LeadUpdateExtractor,
    VisitScheduleExtractor,
};
use crate::timeparse::{NaturalTimeParser, TimeParser};

/// The NLU engine. All patterns are compiled once here; `parse` itself
/// is infallible, side-effect-free, and safe to share across threads.
pub struct Nlu {
    lead_create: LeadCreateExtractor,
    visit_schedule: VisitScheduleExtractor,
    lead_update: LeadUpdateExtractor,
    time: Box<dyn TimeParser>,
}

impl Nlu {
    pub fn new() -> Result<Self> {
        Self::with_time_parser(Box::new(NaturalTimeParser::default()))
    }

    /// Swap in a different date-parsing capability (a configured timezone,
    /// or a deterministic double in tests).
    pub fn with_time_parser(time: Box<dyn TimeParser>) -> Result<Self> {
        Ok(Self {
            lead_create: LeadCreateExtractor::new()?,
            visit_schedule: VisitScheduleExtractor::new()?,
            lead_update: LeadUpdateExtractor::new()?,
            time,
        })
    }

    /// Classify a transcript and extract its entities.
    pub fn parse(&self, transcript: &str) -> ParseResult {
        self.parse_at(transcript, Utc::now())
    }

    /// Like [`parse`](Self::parse) with an explicit reference moment for
    /// relative time phrases.
    pub fn parse_at(&self, transcript: &str, now: DateTime<Utc>) -> ParseResult {
        let text = transcript.trim();
        let lowered = text.to_lowercase();

        if lead_create::gate(&lowered) {
            if let Some(entities) = self.lead_create.extract(text) {
                return ParseResult {
                    intent: Intent::LeadCreate,
                    entities,
                };
            }
        }

        if visit_schedule::gate(&lowered) {
            if let Some(entities) = self.visit_schedule.extract(text, self.time.as_ref(), now) {
                return ParseResult {
                    intent: Intent::VisitSchedule,
                    entities,
                };
            }
        }

        if lead_update::gate(&lowered) {
            if let Some(entities) = self.lead_update.extract(text) {
                return ParseResult {
                    intent: Intent::LeadUpdate,
                    entities,
                };
            }
        }

        ParseResult::unknown()
    }
}

//! leadbot-core: rule-based NLU for CRM bot transcripts.
//!
//! Deterministic intent classification and entity extraction, no ML.
//! Serves as the fallback when AI-enhanced NLU is unavailable.

pub mod entities;
pub mod extractors;
pub mod nlu;
pub mod timeparse;

pub use entities::{
    canonical_source, canonical_status, Entities, Intent, ParseResult, KNOWN_SOURCES,
    VALID_STATUSES,
};
pub use nlu::Nlu;
pub use timeparse::{to_canonical, NaturalTimeParser, TimeParser};

//! Per-intent entity extractors. Each holds its compiled patterns and
//! reports success only when every required entity was found.

pub mod lead_create;
pub mod lead_update;
pub mod visit_schedule;

pub use lead_create::LeadCreateExtractor;
pub use lead_update::LeadUpdateExtractor;
pub use visit_schedule::VisitScheduleExtractor;

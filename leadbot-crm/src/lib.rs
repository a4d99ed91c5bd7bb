//! leadbot-crm: HTTP client for the CRM API plus an in-memory mock for
//! exercising the service layer without a network.

pub mod client;
pub mod mock;

use anyhow::Result;
use serde_json::Value;

/// Outcome of a CRM call: HTTP-style status plus the decoded JSON body.
#[derive(Debug, Clone)]
pub struct CrmResponse {
    pub status: u16,
    pub body: Value,
}

impl CrmResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The three CRM operations the bot can trigger.
#[allow(async_fn_in_trait)]
pub trait CrmApi {
    async fn create_lead(
        &self,
        name: &str,
        phone: &str,
        city: &str,
        source: Option<&str>,
    ) -> Result<CrmResponse>;

    async fn schedule_visit(
        &self,
        lead_id: &str,
        visit_time: &str,
        notes: Option<&str>,
    ) -> Result<CrmResponse>;

    async fn update_lead_status(
        &self,
        lead_id: &str,
        status: &str,
        notes: Option<&str>,
    ) -> Result<CrmResponse>;
}

pub use client::CrmClient;
pub use mock::MockCrm;

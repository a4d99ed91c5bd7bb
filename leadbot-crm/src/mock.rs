//! In-memory CRM double mirroring the real API's status codes and body
//! shapes. Lets handler tests run the full dispatch path offline.

use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{CrmApi, CrmResponse};

#[derive(Default)]
struct State {
    leads: HashMap<String, Value>,
    visits: HashMap<String, Value>,
    next_id: u32,
}

#[derive(Default)]
pub struct MockCrm {
    state: Mutex<State>,
}

impl MockCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a lead so visit/status calls against its id succeed.
    pub fn seed_lead(&self, lead_id: &str) {
        let mut state = self.state.lock().expect("mock crm lock");
        state.leads.insert(
            lead_id.to_string(),
            json!({"lead_id": lead_id, "status": "NEW"}),
        );
    }

    pub fn lead_count(&self) -> usize {
        self.state.lock().expect("mock crm lock").leads.len()
    }

    pub fn visit_count(&self) -> usize {
        self.state.lock().expect("mock crm lock").visits.len()
    }

    fn next_id(state: &mut State, prefix: &str) -> String {
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }
}

impl CrmApi for MockCrm {
    async fn create_lead(
        &self,
        name: &str,
        phone: &str,
        city: &str,
        source: Option<&str>,
    ) -> Result<CrmResponse> {
        let mut state = self.state.lock().expect("mock crm lock");
        let lead_id = Self::next_id(&mut state, "lead");
        state.leads.insert(
            lead_id.clone(),
            json!({
                "lead_id": lead_id,
                "name": name,
                "phone": phone,
                "city": city,
                "source": source,
                "status": "NEW",
            }),
        );
        Ok(CrmResponse {
            status: 201,
            body: json!({"lead_id": lead_id, "status": "NEW"}),
        })
    }

    async fn schedule_visit(
        &self,
        lead_id: &str,
        visit_time: &str,
        notes: Option<&str>,
    ) -> Result<CrmResponse> {
        let mut state = self.state.lock().expect("mock crm lock");
        if !state.leads.contains_key(lead_id) {
            return Ok(CrmResponse {
                status: 404,
                body: json!({"detail": "Lead not found"}),
            });
        }
        let visit_id = Self::next_id(&mut state, "visit");
        state.visits.insert(
            visit_id.clone(),
            json!({
                "visit_id": visit_id,
                "lead_id": lead_id,
                "visit_time": visit_time,
                "notes": notes,
                "status": "SCHEDULED",
            }),
        );
        Ok(CrmResponse {
            status: 201,
            body: json!({"visit_id": visit_id, "status": "SCHEDULED"}),
        })
    }

    async fn update_lead_status(
        &self,
        lead_id: &str,
        status: &str,
        notes: Option<&str>,
    ) -> Result<CrmResponse> {
        let mut state = self.state.lock().expect("mock crm lock");
        let Some(lead) = state.leads.get_mut(lead_id) else {
            return Ok(CrmResponse {
                status: 404,
                body: json!({"detail": "Lead not found"}),
            });
        };
        lead["status"] = json!(status);
        if let Some(notes) = notes {
            lead["notes"] = json!(notes);
        }
        Ok(CrmResponse {
            status: 200,
            body: json!({"lead_id": lead_id, "status": status}),
        })
    }
}

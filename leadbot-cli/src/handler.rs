//! Request handling: transcript validation, NLU, entity checks, CRM
//! dispatch. The CRM is generic so tests run against the in-memory mock.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use leadbot_core::{Entities, Intent};
use leadbot_crm::{CrmApi, CrmResponse};

use crate::ai_nlu::NluOutcome;

#[derive(Debug, Error)]
pub enum HandleError {
    /// Bad input or an intent whose required entities are missing.
    #[error("VALIDATION_ERROR: {0}")]
    Validation(String),
    /// The CRM rejected the call or was unreachable.
    #[error("CRM_ERROR: {0}")]
    Crm(String),
}

#[derive(Debug, Serialize)]
pub struct CrmCall {
    pub endpoint: String,
    pub method: &'static str,
    pub status_code: u16,
}

#[derive(Debug, Serialize)]
pub struct BotResponse {
    pub intent: Intent,
    pub entities: Entities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_call: Option<CrmCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub ai_enhanced: bool,
}

pub fn validate_transcript(max_len: usize, transcript: &str) -> Result<(), HandleError> {
    if transcript.trim().is_empty() || transcript.len() > max_len {
        return Err(HandleError::Validation(
            "Transcript missing or too long".to_string(),
        ));
    }
    Ok(())
}

fn need<'a>(entities: &'a Entities, key: &str, intent: Intent) -> Result<&'a str, HandleError> {
    entities
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| HandleError::Validation(format!("Missing {key} for {intent}")))
}

fn optional<'a>(entities: &'a Entities, key: &str) -> Option<&'a str> {
    entities.get(key).map(String::as_str)
}

/// Route a parsed transcript to the matching CRM call.
pub async fn dispatch<C: CrmApi>(crm: &C, outcome: &NluOutcome) -> Result<BotResponse, HandleError> {
    let intent = outcome.result.intent;
    let entities = &outcome.result.entities;

    let (endpoint, resp, result) = match intent {
        Intent::LeadCreate => {
            let name = need(entities, "name", intent)?;
            let phone = need(entities, "phone", intent)?;
            let city = need(entities, "city", intent)?;
            let resp = crm
                .create_lead(name, phone, city, optional(entities, "source"))
                .await
                .map_err(|e| HandleError::Crm(format!("{e:#}")))?;
            let result = json!({"message": "Lead created", "lead_id": resp.body.get("lead_id")});
            ("/crm/leads".to_string(), resp, result)
        }
        Intent::VisitSchedule => {
            let lead_id = need(entities, "lead_id", intent)?;
            let visit_time = need(entities, "visit_time", intent)?;
            let resp = crm
                .schedule_visit(lead_id, visit_time, optional(entities, "notes"))
                .await
                .map_err(|e| HandleError::Crm(format!("{e:#}")))?;
            let result = json!({"message": "Visit scheduled", "visit_id": resp.body.get("visit_id")});
            ("/crm/visits".to_string(), resp, result)
        }
        Intent::LeadUpdate => {
            let lead_id = need(entities, "lead_id", intent)?;
            let status = need(entities, "status", intent)?;
            let resp = crm
                .update_lead_status(lead_id, status, optional(entities, "notes"))
                .await
                .map_err(|e| HandleError::Crm(format!("{e:#}")))?;
            let result = json!({"message": "Lead status updated", "status": resp.body.get("status")});
            (format!("/crm/leads/{lead_id}/status"), resp, result)
        }
        Intent::Unknown => {
            return Err(HandleError::Validation(
                "Could not determine intent from transcript".to_string(),
            ));
        }
    };

    respond(outcome, endpoint, resp, result)
}

fn respond(
    outcome: &NluOutcome,
    endpoint: String,
    resp: CrmResponse,
    result: Value,
) -> Result<BotResponse, HandleError> {
    if !resp.is_success() {
        return Err(HandleError::Crm(format!(
            "CRM returned {}: {}",
            resp.status, resp.body
        )));
    }
    Ok(BotResponse {
        intent: outcome.result.intent,
        entities: outcome.result.entities.clone(),
        crm_call: Some(CrmCall {
            endpoint,
            method: "POST",
            status_code: resp.status,
        }),
        result: Some(result),
        ai_enhanced: outcome.ai_enhanced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadbot_core::Nlu;
    use leadbot_crm::MockCrm;

    fn rule_based(transcript: &str) -> NluOutcome {
        NluOutcome {
            result: Nlu::new().unwrap().parse(transcript),
            confidence: None,
            ai_enhanced: false,
        }
    }

    #[test]
    fn test_validate_transcript_bounds() {
        assert!(validate_transcript(1000, "Create new lead").is_ok());
        assert!(validate_transcript(1000, "  ").is_err());
        assert!(validate_transcript(10, "this transcript is too long").is_err());
    }

    #[tokio::test]
    async fn test_handle_lead_create() {
        let crm = MockCrm::new();
        let outcome = rule_based("Add a new lead Rohan Sharma from Gurgaon phone 9876543210 source Instagram.");
        let resp = dispatch(&crm, &outcome).await.unwrap();
        assert_eq!(resp.intent, Intent::LeadCreate);
        assert_eq!(resp.result.unwrap()["message"], "Lead created");
        assert_eq!(crm.lead_count(), 1);
        assert_eq!(resp.crm_call.unwrap().status_code, 201);
    }

    #[tokio::test]
    async fn test_handle_lead_create_validation_error() {
        let crm = MockCrm::new();
        let outcome = rule_based("Add a new lead without proper details");
        let err = dispatch(&crm, &outcome).await.unwrap_err();
        assert!(matches!(err, HandleError::Validation(_)));
        assert_eq!(crm.lead_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_visit_schedule() {
        let crm = MockCrm::new();
        crm.seed_lead("7b1b8f54-aaaa-bbbb-cccc-1234567890ab");
        let outcome = rule_based(
            "Schedule a visit for lead 7b1b8f54-aaaa-bbbb-cccc-1234567890ab at 2025-10-02T17:00:00",
        );
        let resp = dispatch(&crm, &outcome).await.unwrap();
        assert_eq!(resp.intent, Intent::VisitSchedule);
        assert_eq!(resp.result.unwrap()["message"], "Visit scheduled");
        assert_eq!(crm.visit_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_visit_for_unknown_lead_is_crm_error() {
        let crm = MockCrm::new();
        let outcome = rule_based("Schedule visit for lead abc-123 at 2025-10-03T10:00:00");
        let err = dispatch(&crm, &outcome).await.unwrap_err();
        assert!(matches!(err, HandleError::Crm(_)));
    }

    #[tokio::test]
    async fn test_handle_lead_update() {
        let crm = MockCrm::new();
        crm.seed_lead("abc-123-def-456");
        let outcome = rule_based("Mark lead abc-123-def-456 status IN PROGRESS");
        let resp = dispatch(&crm, &outcome).await.unwrap();
        assert_eq!(resp.result.unwrap()["message"], "Lead status updated");
    }

    #[tokio::test]
    async fn test_handle_unknown_is_validation_error() {
        let crm = MockCrm::new();
        let outcome = rule_based("good morning");
        let err = dispatch(&crm, &outcome).await.unwrap_err();
        assert!(matches!(err, HandleError::Validation(_)));
    }
}

//! AI-enhanced NLU: an OpenAI-style chat call tried before the rule-based
//! engine. Any failure here degrades to `Nlu::parse`, never to an error.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use leadbot_core::{Entities, Intent, Nlu, ParseResult};

use crate::config::{openai_api_key, Config, NluSection};

const SYSTEM_PROMPT: &str = r#"You are an NLU system for a CRM bot that processes voice transcripts.

SUPPORTED INTENTS:
- LEAD_CREATE: creating new leads with name, phone, city, optional source
- VISIT_SCHEDULE: scheduling visits with lead_id, visit_time, optional notes
- LEAD_UPDATE: updating lead status with lead_id, status, optional notes
- UNKNOWN: when intent cannot be determined

VALID STATUSES: NEW, IN_PROGRESS, FOLLOW_UP, WON, LOST
KNOWN SOURCES: instagram, facebook, linkedin, website, google, ads

ENTITY RULES:
- phone: normalize to digits only
- visit_time: ISO format when possible
- status: one of the valid statuses, underscores for spaces

Respond with JSON only:
{"requests": [{"intent": "INTENT_NAME", "confidence": 0.95, "entities": {"name": "value"}}], "multiple_requests": false}

Handle variations, typos, and conversational language. Confidence is 0.0-1.0."#;

/// NLU result plus provenance, whichever engine produced it.
#[derive(Debug, Clone)]
pub struct NluOutcome {
    pub result: ParseResult,
    pub confidence: Option<f64>,
    pub ai_enhanced: bool,
}

#[derive(Deserialize)]
struct AiEnvelope {
    #[serde(default)]
    requests: Vec<AiRequest>,
    #[serde(default)]
    multiple_requests: bool,
}

#[derive(Deserialize)]
struct AiRequest {
    intent: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    entities: HashMap<String, Value>,
}

/// Run the configured AI classifier when enabled and keyed; otherwise, or
/// on any failure, fall back to the rule-based engine.
pub async fn classify_with_fallback(cfg: &Config, nlu: &Nlu, transcript: &str) -> NluOutcome {
    if cfg.nlu.use_ai {
        if let Some(key) = openai_api_key() {
            match classify(&cfg.nlu, &key, transcript).await {
                Ok(outcome) => return outcome,
                Err(e) => eprintln!("ai nlu failed, using rule-based fallback: {e:#}"),
            }
        }
    }
    NluOutcome {
        result: nlu.parse(transcript),
        confidence: None,
        ai_enhanced: false,
    }
}

async fn classify(cfg: &NluSection, api_key: &str, transcript: &str) -> Result<NluOutcome> {
    let req = serde_json::json!({
        "model": cfg.model,
        "temperature": 0.1,
        "max_tokens": 500,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": format!("Analyze this transcript: {transcript}")},
        ],
    });

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/')))
        .bearer_auth(api_key)
        .json(&req)
        .send()
        .await
        .context("ai nlu request")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("ai nlu http {status}: {body}");
    }

    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }
    #[derive(Deserialize)]
    struct Choice {
        message: Msg,
    }
    #[derive(Deserialize)]
    struct Msg {
        content: String,
    }

    let resp: Resp = resp.json().await.context("decode ai nlu response")?;
    let content = resp
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .unwrap_or_default();

    parse_ai_content(content)
}

/// Decode the model's JSON reply, tolerating code fences and surrounding
/// prose. Multiple detected requests collapse to the highest-confidence
/// non-UNKNOWN one.
fn parse_ai_content(content: &str) -> Result<NluOutcome> {
    let envelope: AiEnvelope =
        serde_json::from_str(extract_json(content)).context("parse ai nlu json")?;

    if envelope.requests.is_empty() {
        bail!("ai nlu returned no requests");
    }

    let best = if envelope.multiple_requests && envelope.requests.len() > 1 {
        envelope
            .requests
            .into_iter()
            .filter(|r| r.intent != "UNKNOWN")
            .max_by(|a, b| {
                a.confidence
                    .unwrap_or(0.0)
                    .total_cmp(&b.confidence.unwrap_or(0.0))
            })
    } else {
        envelope.requests.into_iter().next()
    };

    let Some(best) = best else {
        return Ok(NluOutcome {
            result: ParseResult::unknown(),
            confidence: None,
            ai_enhanced: true,
        });
    };

    let intent = match best.intent.as_str() {
        "LEAD_CREATE" => Intent::LeadCreate,
        "VISIT_SCHEDULE" => Intent::VisitSchedule,
        "LEAD_UPDATE" => Intent::LeadUpdate,
        _ => Intent::Unknown,
    };

    let mut entities = Entities::new();
    for (key, value) in best.entities {
        let value = match value {
            Value::String(s) => s,
            Value::Null => continue,
            other => other.to_string(),
        };
        entities.insert(key, value);
    }

    Ok(NluOutcome {
        result: ParseResult { intent, entities },
        confidence: best.confidence,
        ai_enhanced: true,
    })
}

/// Strip markdown fences and locate the outermost JSON object.
fn extract_json(content: &str) -> &str {
    let cleaned = content.trim();
    let cleaned = cleaned
        .strip_prefix("```json")
        .or_else(|| cleaned.strip_prefix("```"))
        .unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_request() {
        let content = r#"{"requests": [{"intent": "LEAD_CREATE", "confidence": 0.9,
            "entities": {"name": "John Smith", "phone": "8765432109", "city": "Delhi"}}],
            "multiple_requests": false}"#;
        let out = parse_ai_content(content).unwrap();
        assert!(out.ai_enhanced);
        assert_eq!(out.result.intent, Intent::LeadCreate);
        assert_eq!(out.result.entities["name"], "John Smith");
        assert_eq!(out.confidence, Some(0.9));
    }

    #[test]
    fn test_parse_fenced_response() {
        let content = "```json\n{\"requests\": [{\"intent\": \"LEAD_UPDATE\", \"confidence\": 0.8, \"entities\": {\"lead_id\": \"abc-123\", \"status\": \"WON\"}}]}\n```";
        let out = parse_ai_content(content).unwrap();
        assert_eq!(out.result.intent, Intent::LeadUpdate);
        assert_eq!(out.result.entities["status"], "WON");
    }

    #[test]
    fn test_multiple_requests_highest_confidence_wins() {
        let content = r#"{"requests": [
            {"intent": "LEAD_CREATE", "confidence": 0.4, "entities": {}},
            {"intent": "LEAD_UPDATE", "confidence": 0.9, "entities": {"lead_id": "abc", "status": "WON"}},
            {"intent": "UNKNOWN", "confidence": 0.99, "entities": {}}
        ], "multiple_requests": true}"#;
        let out = parse_ai_content(content).unwrap();
        assert_eq!(out.result.intent, Intent::LeadUpdate);
    }

    #[test]
    fn test_null_entities_skipped() {
        let content = r#"{"requests": [{"intent": "VISIT_SCHEDULE",
            "entities": {"lead_id": "abc-123", "visit_time": "2025-10-03T10:00:00", "notes": null}}]}"#;
        let out = parse_ai_content(content).unwrap();
        assert!(!out.result.entities.contains_key("notes"));
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_ai_content("I could not process that.").is_err());
        assert!(parse_ai_content(r#"{"requests": []}"#).is_err());
    }
}

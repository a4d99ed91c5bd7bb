//! Reqwest-backed CRM client with short timeouts and bounded retries on
//! server errors.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

use crate::{CrmApi, CrmResponse};

const TIMEOUT: Duration = Duration::from_secs(3);
const MAX_RETRIES: u32 = 2;

pub struct CrmClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct LeadPayload<'a> {
    name: &'a str,
    phone: &'a str,
    city: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

#[derive(Serialize)]
struct VisitPayload<'a> {
    lead_id: &'a str,
    visit_time: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

#[derive(Serialize)]
struct StatusPayload<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

impl CrmClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .context("build CRM http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// POST with up to two retries on transport errors and 5xx responses,
    /// linear backoff between attempts.
    async fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<CrmResponse> {
        let url = format!("{}{}", self.base_url, path);

        let mut attempt = 0;
        loop {
            let sent = self.http.post(&url).json(payload).send().await;
            match sent {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if (500..=504).contains(&status) && attempt < MAX_RETRIES {
                        attempt += 1;
                        tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                        continue;
                    }
                    let body = resp.json().await.unwrap_or(serde_json::Value::Null);
                    return Ok(CrmResponse { status, body });
                }
                Err(_) if attempt < MAX_RETRIES => {
                    attempt += 1;
                    tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                }
                Err(e) => return Err(e).with_context(|| format!("POST {url}")),
            }
        }
    }
}

impl CrmApi for CrmClient {
    async fn create_lead(
        &self,
        name: &str,
        phone: &str,
        city: &str,
        source: Option<&str>,
    ) -> Result<CrmResponse> {
        self.post_json(
            "/crm/leads",
            &LeadPayload {
                name,
                phone,
                city,
                source,
            },
        )
        .await
    }

    async fn schedule_visit(
        &self,
        lead_id: &str,
        visit_time: &str,
        notes: Option<&str>,
    ) -> Result<CrmResponse> {
        self.post_json(
            "/crm/visits",
            &VisitPayload {
                lead_id,
                visit_time,
                notes,
            },
        )
        .await
    }

    async fn update_lead_status(
        &self,
        lead_id: &str,
        status: &str,
        notes: Option<&str>,
    ) -> Result<CrmResponse> {
        self.post_json(
            &format!("/crm/leads/{lead_id}/status"),
            &StatusPayload { status, notes },
        )
        .await
    }
}

//! Append-only JSONL log of bot interactions for offline analysis.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use leadbot_core::Entities;

use crate::config::ensure_leadbot_home;

#[derive(Debug, Serialize)]
pub struct InteractionRecord {
    pub request_id: String,
    pub timestamp_utc: String,
    pub transcript: String,
    pub intent: String,
    pub entities: Entities,
    pub confidence: Option<f64>,
    pub ai_enhanced: bool,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_time_ms: f64,
}

impl InteractionRecord {
    pub fn request_id() -> String {
        format!("req-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }
}

pub fn analytics_path() -> Result<PathBuf> {
    Ok(ensure_leadbot_home()?.join("analytics.jsonl"))
}

pub fn append_interaction(path: &Path, record: &InteractionRecord) -> Result<()> {
    let line = serde_json::to_string(record).context("serialize interaction record")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("append {}", path.display()))?;
    Ok(())
}

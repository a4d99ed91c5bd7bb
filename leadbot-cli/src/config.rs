use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub fn leadbot_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".leadbot"))
}

pub fn ensure_leadbot_home() -> Result<PathBuf> {
    let dir = leadbot_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub crm: CrmSection,
    pub nlu: NluSection,
    pub limits: LimitsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmSection {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluSection {
    /// Try the AI classifier before the rule-based engine.
    pub use_ai: bool,
    pub model: String,
    pub base_url: String,
    /// IANA timezone for resolving relative time phrases.
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSection {
    pub max_transcript_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crm: CrmSection {
                base_url: "http://localhost:8001".to_string(),
            },
            nlu: NluSection {
                use_ai: false,
                model: "gpt-4o-mini".to_string(),
                base_url: "https://api.openai.com".to_string(),
                timezone: "UTC".to_string(),
            },
            limits: LimitsSection {
                max_transcript_length: 1000,
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_leadbot_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote default config to {}", p.display());
    Ok(())
}

/// The API key never lives in the config file.
pub fn openai_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
}

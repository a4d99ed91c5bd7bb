use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Instant;

mod ai_nlu;
mod analytics;
mod config;
mod handler;

use leadbot_core::{Entities, NaturalTimeParser, Nlu};
use leadbot_crm::CrmClient;

#[derive(Parser, Debug)]
#[command(name = "leadbot", version, about = "CRM voice-bot: rule-based NLU with optional AI assist")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the rule-based NLU on a transcript and print the parse result
    Parse { transcript: String },

    /// Full pipeline: NLU, validation, CRM call, analytics log
    Handle { transcript: String },

    /// Manage ~/.leadbot/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn build_nlu(cfg: &config::Config) -> Result<Nlu> {
    let parser = NaturalTimeParser::new(&cfg.nlu.timezone)
        .with_context(|| format!("nlu.timezone {:?}", cfg.nlu.timezone))?;
    Nlu::with_time_parser(Box::new(parser))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { transcript } => {
            let cfg = config::load_config()?;
            let nlu = build_nlu(&cfg)?;
            let parsed = nlu.parse(&transcript);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Handle { transcript } => handle(&transcript).await?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

async fn handle(transcript: &str) -> Result<()> {
    let cfg = config::load_config()?;
    let started = Instant::now();

    if let Err(e) = handler::validate_transcript(cfg.limits.max_transcript_length, transcript) {
        log_interaction(
            transcript,
            "VALIDATION_ERROR",
            Entities::new(),
            None,
            false,
            false,
            Some(e.to_string()),
            started,
        );
        return Err(e.into());
    }

    let nlu = build_nlu(&cfg)?;
    let outcome = ai_nlu::classify_with_fallback(&cfg, &nlu, transcript).await;
    let crm = CrmClient::new(&cfg.crm.base_url)?;

    match handler::dispatch(&crm, &outcome).await {
        Ok(resp) => {
            log_interaction(
                transcript,
                outcome.result.intent.as_str(),
                outcome.result.entities.clone(),
                outcome.confidence,
                outcome.ai_enhanced,
                true,
                None,
                started,
            );
            println!("{}", serde_json::to_string_pretty(&resp)?);
            Ok(())
        }
        Err(e) => {
            log_interaction(
                transcript,
                outcome.result.intent.as_str(),
                outcome.result.entities.clone(),
                outcome.confidence,
                outcome.ai_enhanced,
                false,
                Some(e.to_string()),
                started,
            );
            Err(e.into())
        }
    }
}

/// Analytics failures are reported but never fail the request.
#[allow(clippy::too_many_arguments)]
fn log_interaction(
    transcript: &str,
    intent: &str,
    entities: Entities,
    confidence: Option<f64>,
    ai_enhanced: bool,
    success: bool,
    error_message: Option<String>,
    started: Instant,
) {
    let record = analytics::InteractionRecord {
        request_id: analytics::InteractionRecord::request_id(),
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        transcript: transcript.to_string(),
        intent: intent.to_string(),
        entities,
        confidence,
        ai_enhanced,
        success,
        error_message,
        response_time_ms: started.elapsed().as_secs_f64() * 1000.0,
    };
    let appended = analytics::analytics_path()
        .and_then(|path| analytics::append_interaction(&path, &record));
    if let Err(e) = appended {
        eprintln!("analytics log failed: {e:#}");
    }
}

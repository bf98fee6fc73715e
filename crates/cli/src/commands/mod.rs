//! CLI commands

pub mod auth;
pub mod billing;
pub mod init;
pub mod invoices;
pub mod status;

use crate::api::{ApiClient, FileTokenStore, RequestError, TokenStore};
use crate::config::ClientConfig;
use crate::gate::UsageGate;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::sync::Arc;
use zeeremind_core::{BlockReason, UpgradePrompt};

/// The shared client plus the gate holding the subscription snapshot.
pub struct Context {
    pub gate: UsageGate,
    pub client: Arc<ApiClient>,
    pub json: bool,
}

impl Context {
    pub fn load(api_url: Option<&str>, json: bool) -> Result<Self> {
        let mut config = ClientConfig::load()?;
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        let tokens: Arc<dyn TokenStore> = Arc::new(
            FileTokenStore::default_location()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?,
        );
        Ok(Self::new(config, tokens, json)?)
    }

    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenStore>,
        json: bool,
    ) -> Result<Self, RequestError> {
        let client = Arc::new(ApiClient::new(config, tokens)?);
        Ok(Self {
            gate: UsageGate::new(Arc::clone(&client)),
            client,
            json,
        })
    }
}

/// Prints the upgrade call-to-action for a blocked action.
pub fn print_upgrade(prompt: &UpgradePrompt) {
    eprintln!("  {} {}", "\u{26a1}".yellow(), prompt.message.bold());
    if prompt.reason != BlockReason::PhoneRequired {
        eprintln!(
            "  Run '{}' to upgrade to Pro.",
            "zeeremind billing checkout".bold()
        );
    }
}

/// `2026-11-01T00:00:00Z` → `Nov 1, 2026`; anything unparseable is shown as-is.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

/// Reads one line from stdin after printing `label` to stderr.
pub fn prompt_line(label: &str) -> Result<String> {
    eprint!("  {}: ", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Client configuration (~/.config/zeeremind/config.toml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const API_URL_ENV: &str = "ZEEREMIND_API_URL";
pub const WEB_URL_ENV: &str = "ZEEREMIND_WEB_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL; endpoints are appended verbatim
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Web app URL, used for pricing and checkout pages
    #[serde(default = "default_web_url")]
    pub web_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for GET requests (state-changing requests never retry by default)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Linear backoff step: retry n waits `n * retry_base_delay_ms`
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_web_url() -> String {
    "http://localhost:3002".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            web_url: default_web_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: ClientConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Loads the user config file (defaults if absent), then applies
    /// `ZEEREMIND_API_URL` / `ZEEREMIND_WEB_URL`.
    pub fn load() -> Result<Self> {
        let config = match config_dir().map(|d| d.join(CONFIG_FILENAME)) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies environment-style overrides from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(url) = lookup(WEB_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.web_url = url;
        }
        self
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// `api_url` + `endpoint`, without doubling the slash.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }
}

/// Returns `~/.config/zeeremind/`, creating it if needed.
pub fn config_dir() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("zeeremind");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

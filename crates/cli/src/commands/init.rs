//! Write a default ~/.config/zeeremind/config.toml

use crate::config::{config_dir, ClientConfig, CONFIG_FILENAME};
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_path()?,
    };

    if config_path.exists() {
        eprintln!(
            "  {} {} already exists",
            "\u{26a0}".yellow(),
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    ClientConfig::default().save(&config_path)?;

    eprintln!(
        "  {} Created {}",
        "\u{2713}".green(),
        config_path.display()
    );
    eprintln!("\n  Point api_url at your backend, then run:");
    eprintln!("    {}", "zeeremind login <email>".bold());
    Ok(())
}

fn default_path() -> Result<PathBuf> {
    config_dir()
        .map(|d| d.join(CONFIG_FILENAME))
        .ok_or_else(|| anyhow!("Could not determine config directory"))
}

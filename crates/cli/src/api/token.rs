//! Session token persistence
//!
//! The token is the only credential the client keeps. It is written on
//! login, and removed on logout or when the backend answers 401.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TOKEN_FILENAME: &str = "token";

pub trait TokenStore: Send + Sync {
    /// The stored token, trimmed. Blank counts as absent.
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token kept in a single file, by default `~/.config/zeeremind/token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TOKEN_FILENAME))
    }

    /// Store under the user config directory.
    pub fn default_location() -> Option<Self> {
        crate::config::config_dir().map(|dir| Self::in_dir(&dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let trimmed = content.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.trim())
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        let guard = self.token.lock().unwrap_or_else(|p| p.into_inner());
        guard.as_deref().map(str::trim).filter(|t| !t.is_empty()).map(String::from)
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut guard = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(token.trim().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
        Ok(())
    }
}

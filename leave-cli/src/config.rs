use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "leave-tracker";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveConfig {
    /// Location of the team data file
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Endpoint for best-effort remote sync, e.g. "https://example.org/leave"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_url: Option<String>,
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,
}

fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("team.json")
}

fn default_sync_timeout_secs() -> u64 {
    10
}

impl Default for LeaveConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            sync_url: None,
            sync_timeout_secs: default_sync_timeout_secs(),
        }
    }
}

impl LeaveConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join(APP_DIR)
            .join("config.toml"))
    }

    /// Load config from disk and apply `LEAVE_DATA_PATH` / `LEAVE_SYNC_URL`.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_overrides(
            std::env::var("LEAVE_DATA_PATH").ok(),
            std::env::var("LEAVE_SYNC_URL").ok(),
        ))
    }

    /// Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Write a default config file unless one exists already.
    pub fn ensure_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            Self::default().save_to(path)?;
        }
        Ok(())
    }

    fn with_overrides(mut self, data_path: Option<String>, sync_url: Option<String>) -> Self {
        if let Some(path) = data_path.filter(|p| !p.trim().is_empty()) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(url) = sync_url {
            // An empty override switches sync off
            self.sync_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        self
    }
}

//! postpilot-config: Configuration loading.
//!
//! Reads `~/.postpilot/config.json5`, falling back to defaults when the
//! file is absent. The backend API key can always be overridden by the
//! `POSTPILOT_API_KEY` environment variable (loaded via dotenv).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("home directory not found")]
    NoHomeDir,
}

/// Generation-backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Content-generation endpoint URL.
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Bearer token; usually supplied via POSTPILOT_API_KEY instead.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout. No retry is attempted on failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8080/v1/generate".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Path of the SQLite job database; defaults to jobs.db in the
    /// config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// Seconds between due scans in serve mode.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Timezone assigned to jobs created without one.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

fn default_tick_secs() -> u64 {
    60
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            tick_secs: default_tick_secs(),
            default_timezone: default_timezone(),
        }
    }
}

/// Top-level postpilot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostpilotConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Resolve the postpilot config directory (~/.postpilot/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".postpilot"))
}

impl PostpilotConfig {
    /// Load from the given file, or defaults when it does not exist.
    /// Applies the POSTPILOT_API_KEY override last.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config: PostpilotConfig = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            json5::from_str(&text)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            PostpilotConfig::default()
        };
        if let Ok(key) = std::env::var("POSTPILOT_API_KEY") {
            config.backend.api_key = key;
        }
        Ok(config)
    }

    /// Load from the default location (~/.postpilot/config.json5).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_dir()?.join("config.json5"))
    }

    /// Effective job-database path.
    pub fn db_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.scheduler.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("jobs.db")),
        }
    }
}

// ABOUTME: Configuration management for firm-intake
// Handles API endpoints, draft storage location and logging defaults, persisted as TOML

use crate::models::EntityKind;
use crate::wizard::{DraftStore, FileDraftStorage};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Store and upload API
    #[serde(default)]
    pub api: ApiConfig,

    /// Local draft persistence
    #[serde(default)]
    pub drafts: DraftConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the admin API routes, e.g. http://localhost:3000/api
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Route receiving multipart attachment uploads
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Logical folder tag sent with each upload
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            upload_folder: default_upload_folder(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Base URL with `segments` appended as path segments (percent-encoded)
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Whether create sessions save drafts at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding draft slots; defaults to ~/.firm-intake/drafts
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_upload_path() -> String {
    "upload".to_string()
}

fn default_upload_folder() -> String {
    "firms/logos".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "firm_intake=info".to_string()
}

impl AppConfig {
    /// Get the base firm-intake directory
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".firm-intake"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.toml"))
    }

    pub fn log_dir() -> PathBuf {
        Self::base_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|_| PathBuf::from(".firm-intake/logs"))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Url::parse(&config.api.base_url)
            .with_context(|| format!("Invalid api.base_url '{}'", config.api.base_url))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Directory for draft slots, honouring the override
    pub fn draft_dir(&self) -> Result<PathBuf> {
        match &self.drafts.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::base_dir()?.join("drafts")),
        }
    }

    /// File-backed draft store for `kind`, or `None` when drafts are disabled
    pub fn draft_store(&self, kind: EntityKind) -> Result<Option<DraftStore>> {
        if !self.drafts.enabled {
            return Ok(None);
        }
        let storage = FileDraftStorage::new(self.draft_dir()?);
        Ok(Some(DraftStore::new(kind, Arc::new(storage))))
    }
}

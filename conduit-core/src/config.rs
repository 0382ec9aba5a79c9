use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    /// Credentials of the last signed-in user.
    #[serde(default)]
    pub session: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    pub fetch_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.realworld.io/api".to_owned(),
            request_timeout_seconds: 10,
            user_agent: concat!("conduit-client/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { fetch_delay_ms: 100 }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl FeedConfig {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

impl ClientConfig {
    /// `<config dir>/conduit`, created on demand.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?.join("conduit");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Where the relationship store lives, next to the config file.
    pub fn relationship_store_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("relationships.json"))
    }

    /// Loads the config file, or falls back to defaults. Defaults are written out
    /// only when no file exists yet.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Ok(path) => Self::load_or_default(&path),
            Err(e) => {
                warn!(error = %e, "no config location, using defaults");
                Self::default()
            }
        }
    }

    /// Like [`ClientConfig::load`] for an explicit path. A malformed file is left
    /// untouched so a stored session survives a bad edit.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let default_config = Self::default();
                if let Err(save_err) = default_config.save_to(path) {
                    warn!(error = %save_err, "could not save default config");
                }
                default_config
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "could not load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Records the signed-in user and saves.
    pub fn update_session(&mut self, session: Option<User>) -> Result<(), ConfigError> {
        self.session = session;
        self.save()
    }
}

//! Client configuration.
//!
//! A small JSON file under the user's config directory, with environment
//! overrides layered on top. Every field is optional; unset fields resolve to
//! the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "rollcall.db";
const APP_DIR_NAME: &str = "rollcall";

pub const DEFAULT_SERVER_URL: &str = "https://comeon-dl9k.onrender.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SCAN_QUIET_WINDOW_MS: u64 = 2000;

pub const SERVER_URL_ENV: &str = "ROLLCALL_SERVER_URL";
pub const TIMEOUT_SECS_ENV: &str = "ROLLCALL_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Attendance server base URL; `/scan` is appended
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Quiet window after an accepted scan
    #[serde(default)]
    pub scan_quiet_window_ms: Option<u64>,
}

const fn default_config_version() -> u32 {
    1
}

/// `<config dir>/rollcall/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// `<local data dir>/rollcall/rollcall.db`
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(DB_FILE_NAME)
}

impl ClientConfig {
    /// Load the default config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&default_config_path())?;
        config.apply_overrides(
            std::env::var(SERVER_URL_ENV).ok(),
            std::env::var(TIMEOUT_SECS_ENV).ok(),
        )?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                version: default_config_version(),
                ..Self::default()
            });
        }

        let raw = std::fs::read_to_string(path)?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {error}",
                path.display()
            ))
        })?;
        config.normalize()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize()?;
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Layer raw override values (typically from the environment) on top.
    pub fn apply_overrides(
        &mut self,
        server_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Result<()> {
        if let Some(server_url) = normalize_text_option(server_url) {
            self.server_url = Some(server_url);
        }
        if let Some(raw) = normalize_text_option(timeout_secs) {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("{TIMEOUT_SECS_ENV} must be a whole number of seconds"))
            })?;
            self.request_timeout_secs = Some(secs);
        }
        self.normalize()
    }

    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn scan_quiet_window(&self) -> Duration {
        Duration::from_millis(
            self.scan_quiet_window_ms
                .unwrap_or(DEFAULT_SCAN_QUIET_WINDOW_MS),
        )
    }

    fn normalize(&mut self) -> Result<()> {
        self.server_url = match normalize_text_option(self.server_url.take()) {
            Some(url) if is_http_url(&url) => Some(url.trim_end_matches('/').to_string()),
            Some(url) => {
                return Err(Error::Config(format!(
                    "server URL '{url}' must include http:// or https://"
                )))
            }
            None => None,
        };
        if self.request_timeout_secs == Some(0) {
            return Err(Error::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

//! Guard configuration.
//!
//! Endpoint locations, storage keys and the expiry margin. Every field has a
//! default so a partial (or missing) config file is valid.
//!
//! Configuration is stored at `~/.config/authguard/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_SKEW_SECONDS;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "authguard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REFRESH_URL: &str = "/api/refresh/";
const DEFAULT_LOGIN_URL: &str = "/api/auth/jwt-login/";
const DEFAULT_ACCESS_KEY: &str = "access";
const DEFAULT_REFRESH_KEY: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Origin that relative request and refresh URLs are resolved against
    pub base_url: String,
    pub refresh_url: String,
    /// Location navigated to whenever authentication cannot be established
    pub login_url: String,
    pub access_key: String,
    pub refresh_key: String,
    /// Seconds before `exp` at which the access token counts as expired
    pub skew_seconds: i64,
    /// Serialize concurrent refreshes into a single network call
    pub coalesce_refresh: bool,
    /// Overall HTTP timeout. `None` leaves latency to the network stack.
    pub timeout_secs: Option<u64>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_url: DEFAULT_REFRESH_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            access_key: DEFAULT_ACCESS_KEY.to_string(),
            refresh_key: DEFAULT_REFRESH_KEY.to_string(),
            skew_seconds: DEFAULT_SKEW_SECONDS,
            coalesce_refresh: false,
            timeout_secs: None,
        }
    }
}

impl GuardConfig {
    /// Default configuration rooted at `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory the file-backed token store lives in
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

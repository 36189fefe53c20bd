//! Client configuration management.
//!
//! Holds the backend base URL, the endpoint names, where the login page is
//! served from and the dashboard page for each role.
//!
//! Configuration is stored at `~/.config/pharmacy-client/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::login::PageRoutes;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "pharmacy-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides `api_base_url`
pub const ENV_API_BASE_URL: &str = "PHARMACY_API_BASE_URL";

/// Overrides `page_url`
pub const ENV_PAGE_URL: &str = "PHARMACY_PAGE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub login_endpoint: String,
    pub session_status_endpoint: String,
    /// URL the login page is served from
    pub page_url: String,
    /// Path under the origin that `pages` are relative to
    pub app_base_path: String,
    pub pages: PageRoutes,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost/pharmacy/api".to_string(),
            login_endpoint: "login".to_string(),
            session_status_endpoint: "session_status".to_string(),
            page_url: "http://localhost/pharmacy/login.html".to_string(),
            app_base_path: "/pharmacy/".to_string(),
            pages: PageRoutes::default(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
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

    /// Apply environment overrides on top of the loaded values
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_PAGE_URL).filter(|v| !v.is_empty()) {
            self.page_url = url;
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "https://rx.example.com/api"}"#).unwrap();
        assert_eq!(config.api_base_url, "https://rx.example.com/api");
        assert_eq!(config.login_endpoint, "login");
        assert_eq!(config.session_status_endpoint, "session_status");
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            ENV_API_BASE_URL => Some("http://10.0.0.5/api".to_string()),
            ENV_PAGE_URL => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://10.0.0.5/api");
        // Empty values are ignored
        assert_eq!(config.page_url, Config::default().page_url);
    }
}

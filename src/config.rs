//! read configuration from a file or the environment

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_USER_AGENT: &str = concat!("storefront-client/", env!("CARGO_PKG_VERSION"));

pub enum ConfigLocation {
    File(PathBuf),
    Env,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport-level timeout applied to every call. Unset means no timeout.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// When set, tokens are persisted to this JSON file instead of memory only.
    pub token_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: None,
            token_file: None,
        }
    }
}

impl Config {
    pub fn from_values(
        base_url: impl Into<String>,
        timeout_secs: Option<u64>,
        token_file: Option<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs,
            user_agent: None,
            token_file,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `STOREFRONT_API_URL` - base URL override, defaults to `http://127.0.0.1:8000/api`
    /// * `STOREFRONT_TIMEOUT_SECS` - optional transport timeout
    /// * `STOREFRONT_USER_AGENT` - optional User-Agent override
    /// * `STOREFRONT_TOKEN_FILE` - optional path for persisted tokens
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("STOREFRONT_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(default_base_url);
        let timeout_secs = match std::env::var("STOREFRONT_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid STOREFRONT_TIMEOUT_SECS '{}': {}", raw, e))
            })?),
            Err(_) => None,
        };
        Ok(Self {
            base_url,
            timeout_secs,
            user_agent: std::env::var("STOREFRONT_USER_AGENT").ok(),
            token_file: std::env::var("STOREFRONT_TOKEN_FILE").ok().map(PathBuf::from),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Base URL with trailing slashes removed, validated as an absolute URL.
    pub fn normalized_base_url(&self) -> Result<String, Error> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        reqwest::Url::parse(trimmed).map_err(|e| {
            Error::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        Ok(trimmed.to_string())
    }
}

pub fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    match loc {
        ConfigLocation::File(path) => Config::from_file(path),
        ConfigLocation::Env => Config::from_env(),
    }
}

use crate::constants;
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::env;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stubhub: StubhubConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StubhubConfig {
    pub venue_url: String,
    pub api_base_url: String,
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: u64,
    /// Continuation pages fetched past the first before an inventory is
    /// reported as truncated.
    #[serde(default = "default_max_extra_pages")]
    pub max_extra_pages: u32,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// CSS selectors used to pull events out of the venue page. Kept in
/// configuration so a markup change is a config edit, not a code change.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_event_anchor")]
    pub event_anchor: String,
    #[serde(default = "default_event_name")]
    pub event_name: String,
    #[serde(default = "default_event_date")]
    pub event_date: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            event_anchor: default_event_anchor(),
            event_name: default_event_name(),
            event_date: default_event_date(),
        }
    }
}

/// API credentials, read from the environment so they never land in the
/// config file. Only required when authentication is requested.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: require_env("STUBHUB_CLIENT_ID")?,
            client_secret: require_env("STUBHUB_CLIENT_SECRET")?,
            username: require_env("STUBHUB_USERNAME")?,
            password: require_env("STUBHUB_PASSWORD")?,
        })
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&content)?;
        if config.stubhub.workers == 0 {
            return Err(ScraperError::Config("workers must be at least 1".into()));
        }
        if config.stubhub.rows_per_page == 0 {
            return Err(ScraperError::Config("rows_per_page must be at least 1".into()));
        }
        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| ScraperError::Config(format!("environment variable {} is not set", key)))
}

fn default_rows_per_page() -> u64 {
    constants::ROWS_PER_PAGE
}

fn default_max_extra_pages() -> u32 {
    constants::MAX_EXTRA_PAGES
}

fn default_workers() -> usize {
    constants::WORKER_COUNT
}

fn default_timeout_seconds() -> u64 {
    constants::REQUEST_TIMEOUT_SECS
}

fn default_event_anchor() -> String {
    constants::EVENT_ANCHOR_SELECTOR.to_string()
}

fn default_event_name() -> String {
    constants::EVENT_NAME_SELECTOR.to_string()
}

fn default_event_date() -> String {
    constants::EVENT_DATE_SELECTOR.to_string()
}

//! Configuration loading for the Atlan CLI.

use anyhow::{bail, Context, Result};
use atlan_client::catalog::{ENV_API_KEY, ENV_BASE_URL};
use atlan_client::search::DEFAULT_PAGE_SIZE;
use atlan_client::{AtlanConfig, RateLimitConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

const REDACTED: &str = "***REDACTED***";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tenant URL, e.g. `https://tenant.atlan.com`.
    #[serde(default)]
    pub base_url: String,

    /// API token for the tenant.
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Page size for searches.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How long tag names stay cached, in seconds.
    #[serde(default = "default_tag_cache_ttl")]
    pub tag_cache_ttl_secs: u64,

    /// Client-side request budget.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_tag_cache_ttl() -> u64 {
    600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            verify_tls: true,
            page_size: default_page_size(),
            tag_cache_ttl_secs: default_tag_cache_ttl(),
            rate_limit: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Fills the tenant URL and token from the environment where the file
    /// left them empty.
    pub fn with_env_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        if self.base_url.trim().is_empty() {
            self.base_url = read(ENV_BASE_URL);
        }
        if self.api_key.trim().is_empty() {
            self.api_key = read(ENV_API_KEY);
        }
        self
    }

    /// Creates a copy with secrets redacted.
    pub fn redact_secrets(&self) -> Self {
        let mut config = self.clone();
        if !config.api_key.is_empty() {
            config.api_key = REDACTED.to_string();
        }
        config
    }

    /// Connector configuration for the tenant.
    pub fn to_atlan_config(&self) -> Result<AtlanConfig> {
        if self.base_url.trim().is_empty() {
            bail!("No tenant URL: set base_url in the config file or {}", ENV_BASE_URL);
        }
        if self.api_key.trim().is_empty() {
            bail!("No API token: set api_key in the config file or {}", ENV_API_KEY);
        }

        let mut config = AtlanConfig::new(self.base_url.trim(), self.api_key.trim());
        config.client.name = "atlan-cli".to_string();
        config.client.timeout_secs = self.timeout_secs;
        config.client.max_retries = self.max_retries;
        config.client.verify_tls = self.verify_tls;
        config.page_size = self.page_size;
        config.tag_cache_ttl_secs = self.tag_cache_ttl_secs;
        config.rate_limit = self.rate_limit.clone();
        Ok(config)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

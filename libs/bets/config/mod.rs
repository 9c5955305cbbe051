//! Client configuration
//!
//! Settings come from a YAML file or from the environment (a `.env` file is
//! honoured). The API token is never read from YAML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BETS_URL: &str = "http://bets.42cc.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

pub const ENV_TOKEN: &str = "BETS_API_TOKEN";
pub const ENV_URL: &str = "BETS_URL";
pub const ENV_TIMEOUT: &str = "BETS_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL: &str = "BETS_POLL_INTERVAL_SECS";
pub const ENV_LOG_LEVEL: &str = "BETS_LOG_LEVEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Bets API client and monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetsConfig {
    /// Base URL of the bets engine
    #[serde(default = "default_bets_url")]
    pub bets_url: String,

    /// Per request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Pause between two polls of watched bets
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// API token from .env (not in YAML)
    #[serde(skip)]
    pub token: String,
}

fn default_bets_url() -> String {
    DEFAULT_BETS_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BetsConfig {
    fn default() -> Self {
        Self {
            bets_url: default_bets_url(),
            timeout_secs: default_timeout(),
            poll_interval_secs: default_poll_interval(),
            log_level: default_log_level(),
            token: String::new(),
        }
    }
}

impl BetsConfig {
    /// Default settings with the given API token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Load configuration from the environment
    ///
    /// `BETS_API_TOKEN` is required, the other variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from a YAML file, token from the environment
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = BetsConfig::default();

        if let Some(url) = var(ENV_URL) {
            config.bets_url = url;
        }
        if let Some(timeout) = var(ENV_TIMEOUT) {
            config.timeout_secs = parse_secs(ENV_TIMEOUT, &timeout)?;
        }
        if let Some(interval) = var(ENV_POLL_INTERVAL) {
            config.poll_interval_secs = parse_secs(ENV_POLL_INTERVAL, &interval)?;
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.token = var(ENV_TOKEN).ok_or_else(|| ConfigError::EnvVarMissing(ENV_TOKEN.into()))?;

        config.validate()?;
        Ok(config)
    }

    fn load_with(
        config_path: impl AsRef<Path>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: BetsConfig = serde_yaml::from_str(&yaml_content)?;

        config.token = var(ENV_TOKEN).ok_or_else(|| ConfigError::EnvVarMissing(ENV_TOKEN.into()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "token must not be empty".to_string(),
            ));
        }

        if !self.bets_url.starts_with("http://") && !self.bets_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "bets_url must be an http(s) URL, got {}",
                self.bets_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Log configuration summary (token excluded)
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Bets URL: {}", self.bets_url);
        info!("  Request timeout: {} seconds", self.timeout_secs);
        info!("  Poll interval: {} seconds", self.poll_interval_secs);
        info!("  Log level: {}", self.log_level);
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{} must be a whole number of seconds, got {:?}", name, value))
    })
}

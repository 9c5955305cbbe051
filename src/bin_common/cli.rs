//! CLI utilities for binaries
//!
//! Resolves where configuration comes from: a YAML file named by
//! `BETS_CONFIG_PATH`, otherwise the environment alone.

use bets::{BetsConfig, ConfigError};
use std::path::PathBuf;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "BETS_CONFIG_PATH";

/// Config file path from the environment, if one is set
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

/// Load configuration for a binary
///
/// The API token always comes from `BETS_API_TOKEN`.
pub fn load_config() -> Result<BetsConfig, ConfigError> {
    match config_path_from_env() {
        Some(path) => BetsConfig::load(path),
        None => BetsConfig::from_env(),
    }
}

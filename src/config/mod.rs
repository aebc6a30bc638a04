pub mod schema;

pub use schema::ProbeConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable holding the API access token. The token is only
/// ever read from the environment, never from the config file.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default config location (~/.schemaprobe/config.toml).
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".schemaprobe").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".schemaprobe/config.toml"))
}

/// Load config from the given path, or return defaults when it is absent.
pub fn load_config(path: &Path) -> Result<ProbeConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read schemaprobe config file")?;
        let config: ProbeConfig =
            toml::from_str(&contents).context("Failed to parse schemaprobe config (TOML)")?;
        Ok(config)
    } else {
        Ok(ProbeConfig::default())
    }
}

/// The API access token, if present and non-empty.
pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
}

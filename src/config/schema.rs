//! Configuration schema for schemaprobe.toml (TOML-based).

use serde::{Deserialize, Serialize};

/// Root configuration structure. Every field has a default so a missing or
/// partial file still yields a runnable setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// OpenAI-compatible API base URL.
    pub api_base_url: String,

    /// Model used for every trial.
    pub model: String,

    /// Sampling temperature. Zero keeps trials comparable across runs.
    pub temperature: f64,

    /// Maximum tokens per model call.
    pub max_tokens: u32,

    /// Maximum model calls per trial before the agent gives up.
    pub max_turns: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openai.com".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            max_tokens: 1024,
            max_turns: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ProbeConfig = toml::from_str("model = \"gpt-4o\"").unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_base_url, "https://api.openai.com");
        assert_eq!(config.max_turns, 16);
    }

    #[test]
    fn empty_toml_is_the_default_config() {
        let config: ProbeConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, ProbeConfig::default().model);
    }
}

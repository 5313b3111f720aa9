//! Configuration handling for the NotiVet CLI.

use std::path::Path;

use anyhow::{Context, Result};
use notivet_core::matcher::MatcherConfig;
use notivet_llm::GeneratorConfig;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `generator.api_key`.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Matcher tuning and vocabulary
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Text generation backend
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from a TOML file, or defaults when no path is given, then apply
    /// the API key from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// A non-blank key replaces the configured one.
    pub fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.generator.api_key = Some(key);
        }
    }
}

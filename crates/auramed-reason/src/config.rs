//! Reasoning configuration persistence and engine selection.

use std::path::{Path, PathBuf};

use auramed_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::parser::ParserKeywords;

pub const DEFAULT_MODEL: &str = "medgemma-4b-it";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_MAX_TOKENS: usize = 300;
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

/// Stored reasoning configuration (persisted to reasoning.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// OpenAI-compatible chat completions URL. `None` selects the rule engine.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_timeout")]
    pub timeout_sec: u64,
    #[serde(default)]
    pub keywords: ParserKeywords,
    /// Path to config file for saving.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SEC
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: DEFAULT_MODEL.into(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_sec: DEFAULT_TIMEOUT_SEC,
            keywords: ParserKeywords::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl ReasoningConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: ReasoningConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        if config.endpoint.is_none() {
            config.endpoint = std::env::var("AURAMED_LLM_ENDPOINT").ok();
        }
        if config.api_key.is_none() {
            config.api_key = std::env::var("AURAMED_LLM_API_KEY").ok();
        }
        if let Ok(model) = std::env::var("AURAMED_LLM_MODEL") {
            config.model = model;
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved reasoning config to {}", self.config_path.display());
        Ok(())
    }

    /// Remote endpoint, if one is configured and non-empty.
    pub fn remote_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(Error::Config("max_tokens must be positive".into()));
        }
        if self.timeout_sec == 0 {
            return Err(Error::Config("timeout_sec must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReasoningConfig::load(&dir.path().join("reasoning.json"));
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.keywords, ParserKeywords::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reasoning.json");

        let mut config = ReasoningConfig::load(&path);
        config.endpoint = Some("http://localhost:8080/v1/chat/completions".into());
        config.keywords.pathological.push("rhonchi".into());
        config.save().unwrap();

        let reloaded = ReasoningConfig::load(&path);
        assert_eq!(
            reloaded.remote_endpoint(),
            Some("http://localhost:8080/v1/chat/completions")
        );
        assert!(reloaded.keywords.pathological.contains(&"rhonchi".to_string()));
    }

    #[test]
    fn test_blank_endpoint_is_not_remote() {
        let config = ReasoningConfig {
            endpoint: Some("   ".into()),
            ..ReasoningConfig::default()
        };
        assert_eq!(config.remote_endpoint(), None);
    }

    #[test]
    fn test_validate_rejects_zero_tokens() {
        let config = ReasoningConfig {
            max_tokens: 0,
            ..ReasoningConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}

//! Service configuration
//!
//! TOML bootstrap settings plus environment-variable resolution for the
//! feedback API key. The TOML file is deliberately minimal: paths and
//! generator parameters only, nothing that changes while running.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Bootstrap configuration loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Preferred on-disk location of the essay collection
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Achievement-standard JSON consulted on every enrichment run
    #[serde(default = "default_criteria_path")]
    pub criteria_path: PathBuf,

    /// Feedback API key; the `OPENAI_API_KEY` environment variable wins
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat model used for draft feedback
    #[serde(default = "default_model")]
    pub model: String,

    /// Fixed timeout for each generator call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            criteria_path: default_criteria_path(),
            openai_api_key: None,
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse config failed: {}", e)))
    }

    /// Resolve the feedback API key.
    ///
    /// Priority: environment variable, then TOML. A warning is logged when
    /// both are set, since that usually means a stale config file.
    pub fn resolve_api_key(&self) -> Result<String> {
        let env_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let toml_key = self
            .openai_api_key
            .clone()
            .filter(|k| !k.trim().is_empty());

        if env_key.is_some() && toml_key.is_some() {
            warn!("OpenAI API key found in both environment and TOML. Using environment (highest priority).");
        }

        if let Some(key) = env_key {
            info!("OpenAI API key loaded from environment variable");
            return Ok(key);
        }

        if let Some(key) = toml_key {
            info!("OpenAI API key loaded from TOML config");
            return Ok(key);
        }

        Err(Error::Config(
            "OpenAI API key not configured. Set OPENAI_API_KEY or add openai_api_key to the TOML config.".to_string(),
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("essays.json")
}

fn default_criteria_path() -> PathBuf {
    PathBuf::from("achievement_standard.json")
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout_secs() -> u64 {
    90
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.store_path, PathBuf::from("essays.json"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout_secs, 90);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_toml_overrides() {
        let config: ServiceConfig = toml::from_str(
            r#"
            store_path = "/var/lib/redink/essays.json"
            model = "gpt-4o"
            request_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.store_path, PathBuf::from("/var/lib/redink/essays.json"));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_key_wins_over_toml() {
        std::env::set_var("OPENAI_API_KEY", "sk-from-env");

        let config = ServiceConfig {
            openai_api_key: Some("sk-from-toml".to_string()),
            ..ServiceConfig::default()
        };

        assert_eq!(config.resolve_api_key().unwrap(), "sk-from-env");
        std::env::remove_var("OPENAI_API_KEY");
    }
}

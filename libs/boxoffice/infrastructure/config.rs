use crate::domain::{Backend, BackendRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `default_backend`
pub const BACKEND_ENV_VAR: &str = "REELMETRICS_BACKEND";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelConfig {
    /// Backend active when a session starts
    pub default_backend: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Backend name -> base URL
    pub backends: BTreeMap<String, String>,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ReelConfig {
    fn default() -> Self {
        let mut backends = BTreeMap::new();
        backends.insert("python".to_string(), "http://localhost:8001".to_string());
        backends.insert("go".to_string(), "http://localhost:8002".to_string());

        Self {
            default_backend: "python".to_string(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            backends,
        }
    }
}

impl ReelConfig {
    /// Load configuration from YAML file and .env
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;

        // Don't fail if .env doesn't exist
        dotenv::dotenv().ok();

        let config = Self::from_yaml_str(&yaml_content)?
            .with_backend_override(std::env::var(BACKEND_ENV_VAR).ok());

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML without touching the environment
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Replace the default backend when an override is given
    pub fn with_backend_override(mut self, backend: Option<String>) -> Self {
        if let Some(name) = backend.filter(|name| !name.trim().is_empty()) {
            info!("Overriding default backend from environment variable");
            self.default_backend = name.trim().to_string();
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one backend must be configured".to_string(),
            ));
        }

        for (name, url) in &self.backends {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "backend '{}' must have an http(s) base URL, got '{}'",
                    name, url
                )));
            }
        }

        if !self.backends.contains_key(&self.default_backend) {
            return Err(ConfigError::ValidationError(format!(
                "default_backend '{}' is not one of: {}",
                self.default_backend,
                self.backends.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
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

    pub fn registry(&self) -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        for (name, url) in &self.backends {
            registry.insert(Backend::new(name.clone(), url.clone()));
        }
        registry
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Default backend: {}", self.default_backend);
        for (name, url) in &self.backends {
            info!("  Backend {}: {}", name, url);
        }
        info!("  Request timeout: {} seconds", self.request_timeout_secs);
        info!("  Log level: {}", self.log_level);
    }
}

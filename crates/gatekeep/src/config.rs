// File: src/config.rs
// Purpose: Configuration parsing from gatekeep.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Gatekeep configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatekeepConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Validation pass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Per-validator time limit in milliseconds; unset means no limit
    #[serde(default)]
    pub validator_timeout_ms: Option<u64>,

    /// Largest request body buffered for validation
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validator_timeout_ms: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ValidationConfig {
    pub fn validator_timeout(&self) -> Option<Duration> {
        self.validator_timeout_ms.map(Duration::from_millis)
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GatekeepConfig {
    /// Load configuration from a TOML file; a missing or empty file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: GatekeepConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load from ./gatekeep.toml
    pub fn load_default() -> Result<Self> {
        Self::load("gatekeep.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatekeepConfig::default();
        assert_eq!(config.server.addr(), "127.0.0.1:3000");
        assert_eq!(config.validation.validator_timeout(), None);
        assert_eq!(config.validation.max_body_bytes, 1024 * 1024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [validation]
            validator_timeout_ms = 250
        "#;
        let config: GatekeepConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.validation.validator_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.validation.max_body_bytes, 1024 * 1024);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = GatekeepConfig::load("does/not/exist/gatekeep.toml").unwrap();
        assert_eq!(config.logging.level, "info");
    }
}

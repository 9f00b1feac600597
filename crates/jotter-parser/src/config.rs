//! Parser client configuration.
//!
//! Loaded from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PARSER_SERVER_URL` | `http://parser-example.com/` |
//! | `PARSER_COMPRESSION` | `zlib` (`none` disables) |
//! | `PARSER_COMPRESSION_LEVEL` | `5` |
//! | `PARSER_TIMEOUT_SECS` | `10` |
//! | `PARSER_ENABLED` | `true` |

use std::env;
use std::time::Duration;

use thiserror::Error;

use jotter_core::defaults;

use crate::compression::Compression;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown compression: {0} (expected 'zlib' or 'none')")]
    InvalidCompression(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parser service settings.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Endpoint that receives the POSTed payload.
    pub server_url: String,
    pub compression: Compression,
    pub timeout: Duration,
    /// When false the passthrough parser is used.
    pub enabled: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            server_url: defaults::PARSER_URL.to_string(),
            compression: Compression::default(),
            timeout: Duration::from_secs(defaults::PARSER_TIMEOUT_SECS),
            enabled: true,
        }
    }
}

impl ParserConfig {
    /// Config pointing at `server_url` with default codec and timeout.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `PARSER_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("PARSER_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(name) = env::var("PARSER_COMPRESSION") {
            config.compression = name.parse()?;
        }
        if let Some(level) = env::var("PARSER_COMPRESSION_LEVEL")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            config.compression = config.compression.with_level(level);
        }
        if let Some(secs) = env::var("PARSER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(enabled) = env::var("PARSER_ENABLED") {
            config.enabled = !matches!(enabled.to_lowercase().as_str(), "false" | "0" | "no");
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "Parser server URL must start with http:// or https://, got: {}",
                self.server_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "Parser timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.server_url, "http://parser-example.com/");
        assert_eq!(config.compression, Compression::Zlib { level: 5 });
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ParserConfig::new("parser.local");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_disabled_config_skips_validation() {
        let mut config = ParserConfig::new("");
        config.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ParserConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}

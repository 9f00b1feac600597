//! Server configuration loaded from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `DATABASE_URL` | `postgres://localhost/jotter` |
//! | `QUOTA_DATABASE_URL` | unset (usage shares the main pool) |
//! | `RATE_LIMIT_ENABLED` | `true` |
//! | `RATE_LIMIT_REQUESTS` | `100` |
//! | `RATE_LIMIT_PERIOD_SECS` | `60` |
//! | `CORS_ALLOWED_ORIGINS` | `http://localhost:3000` |
//! | `MAX_BODY_SIZE_BYTES` | `33554432` |

use std::env;

use thiserror::Error;

use jotter_core::defaults;

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Separate database for usage counters.
    pub quota_database_url: Option<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_period_secs: u64,
    pub cors_allowed_origins: Vec<String>,
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: defaults::SERVER_PORT,
            database_url: "postgres://localhost/jotter".to_string(),
            quota_database_url: None,
            rate_limit_enabled: true,
            rate_limit_requests: defaults::RATE_LIMIT_REQUESTS,
            rate_limit_period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            max_body_size: defaults::MAX_BODY_SIZE_BYTES,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ServerConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ServerConfigError::InvalidValue { key, value }),
        _ => Ok(None),
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var("PORT")? {
            config.port = port;
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        config.quota_database_url = env::var("QUOTA_DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        if let Ok(enabled) = env::var("RATE_LIMIT_ENABLED") {
            config.rate_limit_enabled = enabled == "true" || enabled == "1";
        }
        if let Some(requests) = parse_var("RATE_LIMIT_REQUESTS")? {
            config.rate_limit_requests = requests;
        }
        if let Some(secs) = parse_var("RATE_LIMIT_PERIOD_SECS")? {
            config.rate_limit_period_secs = secs;
        }
        if let Ok(origins) = env::var("CORS_ALLOWED_ORIGINS") {
            let origins = split_origins(&origins);
            if !origins.is_empty() {
                config.cors_allowed_origins = origins;
            }
        }
        if let Some(size) = parse_var("MAX_BODY_SIZE_BYTES")? {
            config.max_body_size = size;
        }

        if config.rate_limit_requests == 0 {
            return Err(ServerConfigError::InvalidValue {
                key: "RATE_LIMIT_REQUESTS",
                value: "0".to_string(),
            });
        }
        if config.rate_limit_period_secs == 0 {
            return Err(ServerConfigError::InvalidValue {
                key: "RATE_LIMIT_PERIOD_SECS",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    /// Address string for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

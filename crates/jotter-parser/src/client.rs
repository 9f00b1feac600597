//! HTTP client for the parser service.
//!
//! The service accepts a (compressed) JSON payload
//! `{"action": "parse", "html": "..."}` and answers with
//! `{"data": {"parsed_html": "..."}}` encoded with the same codec.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use jotter_core::TextParser;

use crate::config::ParserConfig;

/// Parser request failures. Callers normally go through
/// [`ParserClient::parse_or_original`], which never surfaces these.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Parser request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Parser returned HTTP {0}")]
    Status(StatusCode),

    #[error("Failed to encode or decode parser payload: {0}")]
    Codec(#[from] std::io::Error),

    #[error("Malformed parser response: {0}")]
    Malformed(String),
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    action: &'static str,
    html: &'a str,
}

#[derive(Deserialize)]
struct ParseResponse {
    data: ParseData,
}

#[derive(Deserialize)]
struct ParseData {
    parsed_html: String,
}

/// Client for the rich-text parser service.
#[derive(Debug, Clone)]
pub struct ParserClient {
    client: Client,
    config: ParserConfig,
}

impl ParserClient {
    /// Build a client. Fails only if the TLS backend cannot initialise.
    pub fn new(config: ParserConfig) -> Result<Self, ParserError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Send `text` to the parser and return the parsed result.
    pub async fn process(&self, text: &str) -> Result<String, ParserError> {
        let start = Instant::now();
        let codec = self.config.compression;

        let payload = serde_json::to_vec(&ParseRequest {
            action: "parse",
            html: text,
        })
        .map_err(|e| ParserError::Malformed(e.to_string()))?;
        let body = codec.compress(&payload)?;

        let response = self
            .client
            .post(&self.config.server_url)
            .header(CONTENT_TYPE, codec.content_type())
            .body(body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ParserError::Status(response.status()));
        }

        let raw = response.bytes().await?;
        let decoded = codec.decompress(&raw)?;
        let parsed: ParseResponse =
            serde_json::from_str(&decoded).map_err(|e| ParserError::Malformed(e.to_string()))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            subsystem = "parser",
            component = "client",
            op = "process",
            size_bytes = text.len(),
            duration_ms = elapsed,
            "Parser request complete"
        );
        if elapsed > 5000 {
            warn!(
                subsystem = "parser",
                duration_ms = elapsed,
                slow = true,
                "Slow parser request"
            );
        }

        Ok(parsed.data.parsed_html)
    }
}

#[async_trait]
impl TextParser for ParserClient {
    /// Parsed and trimmed text, or the original text (trimmed) when the
    /// parser fails or returns nothing.
    async fn parse_or_original(&self, text: &str) -> String {
        match self.process(text).await {
            Ok(parsed) if !parsed.trim().is_empty() => parsed.trim().to_string(),
            Ok(_) => {
                debug!(
                    subsystem = "parser",
                    component = "client",
                    "Parser returned empty result, keeping original text"
                );
                text.trim().to_string()
            }
            Err(e) => {
                warn!(
                    subsystem = "parser",
                    component = "client",
                    error = %e,
                    "Parser unavailable, keeping original text"
                );
                text.trim().to_string()
            }
        }
    }
}

/// Parser used when the service is disabled. Returns text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughParser;

#[async_trait]
impl TextParser for PassthroughParser {
    async fn parse_or_original(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_keeps_text() {
        let text = "  <b>kept</b> as is ";
        assert_eq!(PassthroughParser.parse_or_original(text).await, text);
    }

    #[test]
    fn test_request_payload_shape() {
        let json = serde_json::to_value(ParseRequest {
            action: "parse",
            html: "<p>x</p>",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"action": "parse", "html": "<p>x</p>"}));
    }
}

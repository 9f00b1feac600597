//! # jotter-parser
//!
//! Client for the external rich-text parser service.
//!
//! Note text is sent to the parser before it is stored. The parser is
//! optional: any failure (network, status, codec, malformed reply) falls back
//! to the original text, so a parser outage never blocks a save.
//!
//! # Example
//!
//! ```rust,no_run
//! use jotter_core::TextParser;
//! use jotter_parser::{ParserClient, ParserConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ParserClient::new(ParserConfig::from_env().unwrap()).unwrap();
//!     let html = client.parse_or_original("<p>Hello</p>").await;
//!     println!("{}", html);
//! }
//! ```

pub mod client;
pub mod compression;
pub mod config;

use std::sync::Arc;

use jotter_core::TextParser;
use tracing::info;

pub use client::{ParserClient, ParserError, PassthroughParser};
pub use compression::Compression;
pub use config::{ConfigError, ConfigResult, ParserConfig};

/// Build the parser selected by `config`.
pub fn build_parser(config: ParserConfig) -> Result<Arc<dyn TextParser>, ParserError> {
    if !config.enabled {
        info!(subsystem = "parser", "Parser disabled, note text is stored as sent");
        return Ok(Arc::new(PassthroughParser));
    }

    info!(
        subsystem = "parser",
        server_url = %config.server_url,
        compression = %config.compression,
        timeout_secs = config.timeout.as_secs(),
        "Parser client configured"
    );
    Ok(Arc::new(ParserClient::new(config)?))
}

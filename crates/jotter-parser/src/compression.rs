//! Payload compression for parser requests and responses.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::config::ConfigError;

/// Codec applied to both request and response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// zlib stream with the given level (0-9).
    Zlib { level: u32 },
    /// Bodies are sent as plain JSON.
    Identity,
}

impl Default for Compression {
    fn default() -> Self {
        Self::Zlib {
            level: jotter_core::defaults::PARSER_COMPRESSION_LEVEL,
        }
    }
}

impl Compression {
    /// Same codec with a different zlib level. No effect on `Identity`.
    pub fn with_level(self, level: u32) -> Self {
        match self {
            Self::Zlib { .. } => Self::Zlib {
                level: level.min(9),
            },
            Self::Identity => Self::Identity,
        }
    }

    /// Compress `data`. Empty input yields empty output.
    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Zlib { level } => {
                let mut encoder =
                    ZlibEncoder::new(Vec::new(), flate2::Compression::new(*level));
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Identity => Ok(data.to_vec()),
        }
    }

    /// Decompress `data` into a UTF-8 string. Empty input yields "".
    pub fn decompress(&self, data: &[u8]) -> io::Result<String> {
        if data.is_empty() {
            return Ok(String::new());
        }
        match self {
            Self::Zlib { .. } => {
                let mut out = String::new();
                ZlibDecoder::new(data).read_to_string(&mut out)?;
                Ok(out)
            }
            Self::Identity => String::from_utf8(data.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }

    /// Content type announced for request bodies.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Zlib { .. } => "application/octet-stream",
            Self::Identity => "application/json",
        }
    }
}

impl FromStr for Compression {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zlib" => Ok(Self::default()),
            "none" | "identity" => Ok(Self::Identity),
            other => Err(ConfigError::InvalidCompression(other.to_string())),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zlib { level } => write!(f, "zlib(level={})", level),
            Self::Identity => write!(f, "none"),
        }
    }
}

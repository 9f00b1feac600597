//! Object-storage URL handling for attachment names.
//!
//! Clients may send either a bare object key or the full public URL of an
//! uploaded file. Only the key is stored; the public URL is rebuilt on read.

use serde::{Deserialize, Serialize};

/// Public URL prefix of the attachments bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUrl {
    base: Option<String>,
}

impl StorageUrl {
    /// `s3_url` is the storage endpoint; with a bucket the base becomes
    /// `s3_url/bucket`. An empty `s3_url` disables rewriting.
    pub fn new(s3_url: &str, bucket: Option<&str>) -> Self {
        let s3_url = s3_url.trim().trim_end_matches('/');
        if s3_url.is_empty() {
            return Self { base: None };
        }
        let base = match bucket.map(str::trim).filter(|b| !b.is_empty()) {
            Some(bucket) => format!("{}/{}", s3_url, bucket.trim_matches('/')),
            None => s3_url.to_string(),
        };
        Self { base: Some(base) }
    }

    /// Read `S3_URL` and `S3_BUCKET`.
    pub fn from_env() -> Self {
        let url = std::env::var("S3_URL").unwrap_or_default();
        let bucket = std::env::var("S3_BUCKET").ok();
        Self::new(&url, bucket.as_deref())
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Strip the public base so only the object key remains.
    pub fn normalize_name(&self, name: &str) -> String {
        let name = self.clean_name(name.trim());
        let Some(base) = &self.base else {
            return name;
        };
        match name.strip_prefix(base.as_str()) {
            // Only strip at a path boundary: `notes-old/` is another bucket.
            Some(key) if key.is_empty() || key.starts_with('/') => {
                key.trim_start_matches('/').to_string()
            }
            _ => name,
        }
    }

    /// Restore a base URL whose `//` was collapsed to `/` by path cleaning.
    pub fn clean_name(&self, name: &str) -> String {
        match &self.base {
            Some(base) if base.contains("//") => {
                let collapsed = base.replace("//", "/");
                if name.starts_with(base.as_str()) {
                    name.to_string()
                } else {
                    name.replacen(&collapsed, base, 1)
                }
            }
            _ => name.to_string(),
        }
    }

    /// Public URL for a stored key.
    pub fn url_for(&self, key: &str) -> String {
        match &self.base {
            Some(base) => format!("{}/{}", base, key.trim_start_matches('/')),
            None => key.to_string(),
        }
    }
}

//! Centralized default constants for jotter.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Quota values here are only fallbacks: the live free-tier limits
//! come from the `settings` table.

// =============================================================================
// QUOTA
// =============================================================================

/// Settings key: max size of a single note (text + all attachments).
pub const KEY_NOTE_MAX_SIZE: &str = "NOTES_MAX_SIZE";

/// Settings key: monthly usage quota.
pub const KEY_MONTH_USAGE_QUOTA: &str = "NOTES_MONTH_USAGE_QUOTA";

/// Settings key: max size of one attachment for free accounts.
pub const KEY_ATTACHMENT_MAX_SIZE: &str = "NOTES_MAX_ATTACHMENT_SIZE";

/// Settings key: attachment ceiling advertised to free users as the premium offer.
pub const KEY_ATTACHMENT_MAX_SIZE_PREMIUM: &str = "NOTES_MAX_ATTACHMENT_SIZE_PREMIUM_DEFAULT";

const MB: i64 = 1024 * 1024;

/// Free tier: max note size in bytes (10 MB).
pub const NOTE_MAX_SIZE: i64 = 10 * MB;

/// Free tier: monthly usage quota in bytes (60 MB).
pub const MONTH_USAGE_QUOTA: i64 = 60 * MB;

/// Free tier: max attachment size in bytes (10 MB).
pub const ATTACHMENT_MAX_SIZE: i64 = 10 * MB;

/// Premium default attachment ceiling in bytes (100 MB).
pub const ATTACHMENT_MAX_SIZE_PREMIUM: i64 = 100 * MB;

// =============================================================================
// PARSER SERVICE
// =============================================================================

/// Default parser service URL.
pub const PARSER_URL: &str = "http://parser-example.com/";

/// Default parser request timeout in seconds.
pub const PARSER_TIMEOUT_SECS: u64 = 10;

/// Default zlib compression level for parser payloads.
pub const PARSER_COMPRESSION_LEVEL: u32 = 5;

// =============================================================================
// PLACES
// =============================================================================

/// Default page size for place lookups.
pub const PLACE_LIMIT: i64 = 10;

/// Upper bound for the place lookup `limit` parameter.
pub const PLACE_LIMIT_MAX: i64 = 100;

/// Minimum search term length for place lookups.
pub const PLACE_QUERY_MIN_LEN: usize = 2;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes.
///
/// Attachments are uploaded to object storage directly; the API only sees
/// note text and metadata.
pub const MAX_BODY_SIZE_BYTES: usize = 32 * 1024 * 1024;

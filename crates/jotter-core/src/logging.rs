//! Structured logging schema and field name constants for jotter.
//!
//! `tracing` macros take field keys as identifiers, so call sites spell
//! these names literally. The constants are the reference for log queries
//! and for code that builds fields dynamically.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (parser outage) |
//! | INFO  | Lifecycle events (startup, shutdown), quota rejections |
//! | DEBUG | Decision points: resolved limits, usage commits |
//! | TRACE | Per-item detail (place rows, payload sizes) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "quota", "parser"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "validator", "limits", "client", "pool", "envelope"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "validate", "process", "search", "commit_usage"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// User the operation is performed for.
pub const USER_ID: &str = "user_id";

/// Note being operated on.
pub const NOTE_ID: &str = "note_id";

/// Place kind ("airport" / "city").
pub const PLACE_KIND: &str = "place_kind";

/// Envelope action name.
pub const ACTION: &str = "action";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Byte size of a note or attachment.
pub const SIZE_BYTES: &str = "size_bytes";

/// Applicable ceiling in bytes.
pub const MAX_SIZE_BYTES: &str = "max_size_bytes";

/// Usage counter after commit.
pub const USAGE_BYTES: &str = "usage_bytes";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Envelope error code.
pub const ERROR_CODE: &str = "error_code";

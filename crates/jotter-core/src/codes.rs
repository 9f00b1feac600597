//! Numeric error codes shared with the web client.
//!
//! The values are part of the wire contract of the action envelope
//! (`{"errorCode": n, ...}`) and must not be renumbered. Several of the
//! positive codes are written in hex on purpose: `0x10` is sixteen, not ten.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code reported in the `errorCode` field of an action response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const NO_ERROR: Self = Self(0);
    pub const UNKNOWN: Self = Self(-1);

    // ─── Request envelope ─────────────────────────────────────────────────
    pub const INVALID_REQUEST_FORMAT: Self = Self(0x00001);
    pub const INVALID_REQUEST_ACTION: Self = Self(0x00002);
    pub const INVALID_REQUEST_BODY: Self = Self(0x00003);
    pub const SAVE_DATA: Self = Self(0x00008);

    // ─── Quota ────────────────────────────────────────────────────────────
    pub const ATTACHMENT_SIZE_QUOTA_EXCEED_STANDARD: Self = Self(0x00009);
    pub const ATTACHMENT_SIZE_QUOTA_EXCEED_PREMIUM: Self = Self(0x00010);
    pub const NOTE_SIZE_QUOTA_EXCEED: Self = Self(0x00011);
    pub const TOTAL_SIZE_QUOTA_EXCEED: Self = Self(0x00012);

    // ─── Service errors ───────────────────────────────────────────────────
    pub const NOT_WELL_FORMED: Self = Self(-1);
    pub const ACTION_PARAM_IS_MISSED: Self = Self(-2);
    pub const UNRECOGNIZED_ACTION: Self = Self(-3);
    pub const USER_ALREADY_EXISTS: Self = Self(-4);
    pub const STORAGE_ENGINE_RETURNS_ERROR: Self = Self(-5);
    pub const AUTH_FAILED: Self = Self(-6);
    pub const USER_NOT_EXISTS: Self = Self(-7);
    pub const INTERNAL_DATA_JSON_MALFORMED: Self = Self(-8);
    pub const WRONG_ARGUMENTS_COUNT: Self = Self(-9);
    pub const INTERNAL_SERVER_ERROR: Self = Self(-10);
    pub const INTERNAL_FILE_SYSTEM_ERROR: Self = Self(-11);
    pub const INTERNAL_SENDMAIL_ERROR: Self = Self(-12);
    pub const TOO_MUCH_REQUESTS: Self = Self(-13);
    pub const ACCESS_DENIED: Self = Self(-14);
    pub const MAX_EMAILS_LIMIT_REACHED: Self = Self(-15);
    pub const DATA_TOO_LARGE: Self = Self(-16);
    pub const ALREADY_LOCKED: Self = Self(-17);
    pub const EXTERNAL_DATA_MALFORMED: Self = Self(-18);
    pub const NOT_FOUND: Self = Self(-19);
    pub const COUNT_ITEMS_QUOTA_EXCEED: Self = Self(-20);
    pub const ITEM_ALREADY_EXISTS: Self = Self(-21);
    pub const UPLOADCARE_ERROR: Self = Self(-22);
    pub const UNDEFINED_ERROR: Self = Self(-1000);

    /// Raw numeric value.
    pub fn value(self) -> i32 {
        self.0
    }

    /// True for `NO_ERROR`.
    pub fn is_ok(self) -> bool {
        self == Self::NO_ERROR
    }

    /// Default user-facing message for this code.
    ///
    /// Quota codes return a size-free sentence here; the messages carrying
    /// concrete limits are built by [`crate::quota::QuotaViolation::message`].
    /// Codes without a registered message fall back to "Unknown error".
    pub fn message(self) -> &'static str {
        match self {
            Self::NO_ERROR => "",
            Self::INVALID_REQUEST_FORMAT => "Invalid request format",
            Self::INVALID_REQUEST_ACTION => "Invalid request action",
            Self::INVALID_REQUEST_BODY => "Invalid request body",
            Self::SAVE_DATA => "Can't save data",
            Self::ATTACHMENT_SIZE_QUOTA_EXCEED_STANDARD
            | Self::ATTACHMENT_SIZE_QUOTA_EXCEED_PREMIUM => {
                "Unfortunately, the file size exceeds the allowed limit."
            }
            Self::NOTE_SIZE_QUOTA_EXCEED => {
                "Unfortunately, the size of the note exceeds the allowed limit."
            }
            Self::TOTAL_SIZE_QUOTA_EXCEED => {
                "You have reached your monthly traffic limit. To continue, \
                 you have to purchase Project Pro."
            }
            Self::AUTH_FAILED => "Authentication failed",
            Self::NOT_FOUND => "Not found",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

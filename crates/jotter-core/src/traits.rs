//! Core traits for jotter abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::*;
use crate::quota::PremiumLimits;

// =============================================================================
// QUOTA REPOSITORY TRAITS
// =============================================================================

/// Monthly usage counters, one per user and period.
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    /// Usage recorded for `period`. A missing or stale record reads as 0.
    async fn usage(&self, user_id: i64, period: NaiveDate) -> Result<i64>;

    /// Atomically add `delta` to the usage for `period`, provided the result
    /// stays within `ceiling`.
    ///
    /// Returns the new usage, or `None` when the increment would exceed the
    /// ceiling. A record from an earlier period is reset before adding.
    async fn try_add_usage(
        &self,
        user_id: i64,
        period: NaiveDate,
        delta: i64,
        ceiling: i64,
    ) -> Result<Option<i64>>;
}

/// Premium subscriptions and their per-user limits.
#[async_trait]
pub trait PremiumRepository: Send + Sync {
    /// The user's subscription, if they ever had one.
    async fn subscription(&self, user_id: i64) -> Result<Option<Subscription>>;

    async fn premium_limits(&self, user_id: i64) -> Result<Option<PremiumLimits>>;
}

/// Key/value application settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Values for the requested keys. Absent keys are omitted from the map.
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Repository for notes and their attachments.
///
/// Every method is scoped to the owning user; a note owned by someone else
/// behaves as if it does not exist.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Fetch a note with its attachments.
    async fn fetch(&self, user_id: i64, id: i64) -> Result<Option<NoteFull>>;

    /// Insert a new note or replace the text of an existing one.
    async fn save(&self, req: &SaveNoteRequest) -> Result<Note>;

    /// Delete a note and its attachments. Returns false when not found.
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool>;

    async fn add_attachment(&self, req: &CreateAttachmentRequest) -> Result<Attachment>;

    /// Remove an attachment. Returns false when not found.
    async fn remove_attachment(&self, user_id: i64, note_id: i64, attachment_id: i64)
        -> Result<bool>;
}

// =============================================================================
// PLACE REPOSITORY TRAITS
// =============================================================================

/// Airport and city lookups.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Places whose code equals the term or whose name starts with it
    /// (case-insensitive). Exact code matches come first.
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>>;

    async fn get(&self, kind: PlaceKind, code: &str) -> Result<Option<Place>>;

    /// Insert or replace a place. Returns true when a new row was created.
    async fn upsert(&self, place: &Place) -> Result<bool>;

    /// Returns false when no such place exists.
    async fn delete(&self, kind: PlaceKind, code: &str) -> Result<bool>;
}

// =============================================================================
// PARSER TRAITS
// =============================================================================

/// Rich-text sanitizer applied to note text before it is stored.
#[async_trait]
pub trait TextParser: Send + Sync {
    /// Parsed text, or `text` unchanged when parsing is unavailable.
    async fn parse_or_original(&self, text: &str) -> String;
}

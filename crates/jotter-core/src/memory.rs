//! In-memory repository implementations for tests.
//!
//! Enabled with the `memory` feature (always on for this crate's own tests).
//! State lives behind `std::sync::Mutex`; no lock is held across an await.
//!
//! ```rust,ignore
//! use jotter_core::memory::MemoryPlaceRepository;
//!
//! let places = MemoryPlaceRepository::new();
//! places.insert(place);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::Result;
use crate::models::*;
use crate::quota::PremiumLimits;
use crate::traits::*;

// =============================================================================
// QUOTA
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct UsageRecord {
    period: NaiveDate,
    usage: i64,
}

/// Usage counters keyed by user.
#[derive(Default)]
pub struct MemoryQuotaRepository {
    records: Mutex<HashMap<i64, UsageRecord>>,
}

impl MemoryQuotaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a usage record.
    pub fn set(&self, user_id: i64, period: NaiveDate, usage: i64) {
        self.records
            .lock()
            .unwrap()
            .insert(user_id, UsageRecord { period, usage });
    }

    /// Stored usage when the record belongs to `period`.
    pub fn current(&self, user_id: i64, period: NaiveDate) -> Option<i64> {
        self.records
            .lock()
            .unwrap()
            .get(&user_id)
            .filter(|r| r.period == period)
            .map(|r| r.usage)
    }
}

#[async_trait]
impl QuotaRepository for MemoryQuotaRepository {
    async fn usage(&self, user_id: i64, period: NaiveDate) -> Result<i64> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id)
            .or_insert(UsageRecord { period, usage: 0 });
        if record.period < period {
            *record = UsageRecord { period, usage: 0 };
        }
        Ok(record.usage)
    }

    async fn try_add_usage(
        &self,
        user_id: i64,
        period: NaiveDate,
        delta: i64,
        ceiling: i64,
    ) -> Result<Option<i64>> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id)
            .or_insert(UsageRecord { period, usage: 0 });
        if record.period < period {
            *record = UsageRecord { period, usage: 0 };
        }
        match record.usage.checked_add(delta) {
            Some(next) if next <= ceiling => record.usage = next,
            _ => return Ok(None),
        }
        Ok(Some(record.usage))
    }
}

// =============================================================================
// PREMIUM
// =============================================================================

#[derive(Default)]
pub struct MemoryPremiumRepository {
    subscriptions: Mutex<HashMap<i64, Subscription>>,
    limits: Mutex<HashMap<i64, PremiumLimits>>,
}

impl MemoryPremiumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subscription(&self, subscription: Subscription) {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.user_id, subscription);
    }

    pub fn set_limits(&self, limits: PremiumLimits) {
        self.limits.lock().unwrap().insert(limits.user_id, limits);
    }
}

#[async_trait]
impl PremiumRepository for MemoryPremiumRepository {
    async fn subscription(&self, user_id: i64) -> Result<Option<Subscription>> {
        Ok(self.subscriptions.lock().unwrap().get(&user_id).cloned())
    }

    async fn premium_limits(&self, user_id: i64) -> Result<Option<PremiumLimits>> {
        Ok(self.limits.lock().unwrap().get(&user_id).copied())
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Default)]
pub struct MemorySettingsRepository {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        let values = self.values.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|k| values.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}

// =============================================================================
// NOTES
// =============================================================================

#[derive(Default)]
struct NoteStore {
    notes: HashMap<i64, Note>,
    attachments: Vec<Attachment>,
    next_note_id: i64,
    next_attachment_id: i64,
}

impl NoteStore {
    fn owned(&self, user_id: i64, id: i64) -> Option<&Note> {
        self.notes.get(&id).filter(|n| n.user_id == user_id)
    }
}

#[derive(Default)]
pub struct MemoryNoteRepository {
    store: Mutex<NoteStore>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes across all users.
    pub fn len(&self) -> usize {
        self.store.lock().unwrap().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn fetch(&self, user_id: i64, id: i64) -> Result<Option<NoteFull>> {
        let store = self.store.lock().unwrap();
        Ok(store.owned(user_id, id).map(|note| NoteFull {
            note: note.clone(),
            attachments: store
                .attachments
                .iter()
                .filter(|a| a.note_id == id)
                .cloned()
                .collect(),
        }))
    }

    async fn save(&self, req: &SaveNoteRequest) -> Result<Note> {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();

        if let Some(id) = req.id {
            let note = store
                .notes
                .get_mut(&id)
                .filter(|n| n.user_id == req.user_id)
                .ok_or(crate::Error::NoteNotFound(id))?;
            note.text = req.text.clone();
            note.updated_at = now;
            return Ok(note.clone());
        }

        store.next_note_id += 1;
        let note = Note {
            id: store.next_note_id,
            user_id: req.user_id,
            text: req.text.clone(),
            created_at: now,
            updated_at: now,
        };
        store.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let mut store = self.store.lock().unwrap();
        if store.owned(user_id, id).is_none() {
            return Ok(false);
        }
        store.notes.remove(&id);
        store.attachments.retain(|a| a.note_id != id);
        Ok(true)
    }

    async fn add_attachment(&self, req: &CreateAttachmentRequest) -> Result<Attachment> {
        let mut store = self.store.lock().unwrap();
        if store.owned(req.user_id, req.note_id).is_none() {
            return Err(crate::Error::NoteNotFound(req.note_id));
        }
        store.next_attachment_id += 1;
        let attachment = Attachment {
            id: store.next_attachment_id,
            note_id: req.note_id,
            name: req.name.clone(),
            size: req.size,
            created_at: Utc::now(),
        };
        store.attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn remove_attachment(
        &self,
        user_id: i64,
        note_id: i64,
        attachment_id: i64,
    ) -> Result<bool> {
        let mut store = self.store.lock().unwrap();
        if store.owned(user_id, note_id).is_none() {
            return Ok(false);
        }
        let before = store.attachments.len();
        store
            .attachments
            .retain(|a| !(a.note_id == note_id && a.id == attachment_id));
        Ok(store.attachments.len() < before)
    }
}

// =============================================================================
// PLACES
// =============================================================================

#[derive(Default)]
pub struct MemoryPlaceRepository {
    places: Mutex<HashMap<(PlaceKind, String), Place>>,
}

impl MemoryPlaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, place: Place) {
        self.places
            .lock()
            .unwrap()
            .insert((place.kind, place.code.clone()), place);
    }
}

#[async_trait]
impl PlaceRepository for MemoryPlaceRepository {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>> {
        let code = query.term.to_ascii_uppercase();
        let prefix = query.term.to_lowercase();
        let places = self.places.lock().unwrap();

        let mut hits: Vec<&Place> = places
            .values()
            .filter(|p| p.kind == query.kind)
            .filter(|p| p.code == code || p.name.to_lowercase().starts_with(&prefix))
            .collect();
        hits.sort_by(|a, b| {
            (a.code != code)
                .cmp(&(b.code != code))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.code.cmp(&b.code))
        });

        Ok(hits
            .into_iter()
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, kind: PlaceKind, code: &str) -> Result<Option<Place>> {
        Ok(self
            .places
            .lock()
            .unwrap()
            .get(&(kind, code.to_ascii_uppercase()))
            .cloned())
    }

    async fn upsert(&self, place: &Place) -> Result<bool> {
        let previous = self
            .places
            .lock()
            .unwrap()
            .insert((place.kind, place.code.clone()), place.clone());
        Ok(previous.is_none())
    }

    async fn delete(&self, kind: PlaceKind, code: &str) -> Result<bool> {
        Ok(self
            .places
            .lock()
            .unwrap()
            .remove(&(kind, code.to_ascii_uppercase()))
            .is_some())
    }
}

//! Note operations with parsing and quota enforcement.
//!
//! Every mutation that can grow a note goes through the same sequence:
//!
//! 1. Load the current note (ownership-checked) to get its size
//! 2. Build a [`SizeChange`] and validate it against the user's limits
//! 3. Persist only if validation passed
//!
//! Validation commits usage before the write. A failed write after a
//! successful validation leaves the usage counter slightly ahead, which is
//! the conservative direction for a quota.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use jotter_core::{
    text_size, Attachment, CreateAttachmentRequest, Error, NoteFull, NoteRepository,
    QuotaSnapshot, QuotaValidator, Result, SaveNoteRequest, SizeChange, StorageUrl, TextParser,
};

/// Attachment as returned to the client, with its public URL.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

/// Note as returned to the client.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: i64,
    pub text: String,
    /// Text bytes plus attachment bytes.
    pub size: i64,
    pub attachments: Vec<AttachmentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a quota-checked mutation.
#[derive(Debug, Clone)]
pub struct Saved<T> {
    pub value: T,
    /// Usage for the current period after the mutation.
    pub usage: i64,
}

#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    quota: QuotaValidator,
    parser: Arc<dyn TextParser>,
    storage: StorageUrl,
}

impl NoteService {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        quota: QuotaValidator,
        parser: Arc<dyn TextParser>,
        storage: StorageUrl,
    ) -> Self {
        Self {
            notes,
            quota,
            parser,
            storage,
        }
    }

    pub fn quota(&self) -> &QuotaValidator {
        &self.quota
    }

    async fn fetch_owned(&self, user_id: i64, id: i64) -> Result<NoteFull> {
        self.notes
            .fetch(user_id, id)
            .await?
            .ok_or(Error::NoteNotFound(id))
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<NoteView> {
        let full = self.fetch_owned(user_id, id).await?;
        Ok(self.view(full))
    }

    /// Create (`id = None`) or update note text.
    pub async fn save(&self, user_id: i64, id: Option<i64>, text: &str) -> Result<Saved<NoteView>> {
        let parsed = self.parser.parse_or_original(text).await;

        let (prev_size, attachments_size, attachments) = match id {
            Some(id) => {
                let full = self.fetch_owned(user_id, id).await?;
                (full.size(), full.attachments_size(), full.attachments)
            }
            None => (0, 0, Vec::new()),
        };

        let new_size = text_size(&parsed)
            .checked_add(attachments_size)
            .ok_or_else(|| Error::InvalidInput("Note size is out of range".to_string()))?;
        let change = SizeChange {
            user_id,
            prev_size,
            new_size,
            attachment_size: 0,
        };
        let usage = self.quota.validate(&change).await?;

        let note = self
            .notes
            .save(&SaveNoteRequest {
                user_id,
                id,
                text: parsed,
            })
            .await?;

        info!(
            subsystem = "api",
            component = "notes",
            op = "save",
            user_id,
            note_id = note.id,
            size_bytes = change.new_size,
            usage_bytes = usage,
            "Note saved"
        );

        Ok(Saved {
            value: self.view(NoteFull { note, attachments }),
            usage,
        })
    }

    /// Add an attachment. `name` may be a bare key or a full public URL.
    pub async fn attach(
        &self,
        user_id: i64,
        note_id: i64,
        name: &str,
        size: i64,
    ) -> Result<Saved<AttachmentView>> {
        if size < 0 {
            return Err(Error::InvalidInput(
                "Attachment size must not be negative".to_string(),
            ));
        }
        let key = self.storage.normalize_name(name);
        if key.is_empty() {
            return Err(Error::InvalidInput("Attachment name is required".to_string()));
        }

        let full = self.fetch_owned(user_id, note_id).await?;
        let prev_size = full.size();
        let new_size = prev_size
            .checked_add(size)
            .ok_or_else(|| Error::InvalidInput("Attachment size is out of range".to_string()))?;
        let change = SizeChange {
            user_id,
            prev_size,
            new_size,
            attachment_size: size,
        };
        let usage = self.quota.validate(&change).await?;

        let attachment = self
            .notes
            .add_attachment(&CreateAttachmentRequest {
                user_id,
                note_id,
                name: key,
                size,
            })
            .await?;

        info!(
            subsystem = "api",
            component = "notes",
            op = "attach",
            user_id,
            note_id,
            size_bytes = size,
            usage_bytes = usage,
            "Attachment added"
        );

        Ok(Saved {
            value: self.attachment_view(attachment),
            usage,
        })
    }

    /// Remove an attachment. Freed bytes are not returned to the monthly usage.
    pub async fn detach(&self, user_id: i64, note_id: i64, attachment_id: i64) -> Result<()> {
        if !self
            .notes
            .remove_attachment(user_id, note_id, attachment_id)
            .await?
        {
            return Err(Error::NotFound(format!(
                "Attachment {} not found",
                attachment_id
            )));
        }
        debug!(
            subsystem = "api",
            component = "notes",
            op = "detach",
            user_id,
            note_id,
            "Attachment removed"
        );
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<()> {
        if !self.notes.delete(user_id, id).await? {
            return Err(Error::NoteNotFound(id));
        }
        debug!(
            subsystem = "api",
            component = "notes",
            op = "delete",
            user_id,
            note_id = id,
            "Note deleted"
        );
        Ok(())
    }

    pub async fn quota_snapshot(&self, user_id: i64) -> Result<QuotaSnapshot> {
        self.quota.snapshot(user_id).await
    }

    fn attachment_view(&self, attachment: Attachment) -> AttachmentView {
        AttachmentView {
            id: attachment.id,
            url: self.storage.url_for(&attachment.name),
            name: attachment.name,
            size: attachment.size,
            created_at: attachment.created_at,
        }
    }

    fn view(&self, full: NoteFull) -> NoteView {
        let size = full.size();
        let NoteFull { note, attachments } = full;
        NoteView {
            id: note.id,
            text: note.text,
            size,
            attachments: attachments
                .into_iter()
                .map(|a| self.attachment_view(a))
                .collect(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

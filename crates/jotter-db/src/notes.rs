//! Note and attachment repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use jotter_core::{
    Attachment, CreateAttachmentRequest, Error, Note, NoteFull, NoteRepository, Result,
    SaveNoteRequest,
};

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn note_from_row(row: &PgRow) -> Note {
    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn attachment_from_row(row: &PgRow) -> Attachment {
    Attachment {
        id: row.get("id"),
        note_id: row.get("note_id"),
        name: row.get("name"),
        size: row.get("size"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn fetch(&self, user_id: i64, id: i64) -> Result<Option<NoteFull>> {
        let Some(row) = sqlx::query(
            "SELECT id, user_id, text, created_at, updated_at FROM note WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        else {
            return Ok(None);
        };

        let attachments = sqlx::query(
            r#"
            SELECT id, note_id, name, size, created_at
            FROM note_attachment
            WHERE note_id = $1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Some(NoteFull {
            note: note_from_row(&row),
            attachments: attachments.iter().map(attachment_from_row).collect(),
        }))
    }

    async fn save(&self, req: &SaveNoteRequest) -> Result<Note> {
        let row = match req.id {
            Some(id) => sqlx::query(
                r#"
                UPDATE note SET text = $3, updated_at = now()
                WHERE id = $1 AND user_id = $2
                RETURNING id, user_id, text, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(req.user_id)
            .bind(&req.text)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?,
            None => sqlx::query(
                r#"
                INSERT INTO note (user_id, text) VALUES ($1, $2)
                RETURNING id, user_id, text, created_at, updated_at
                "#,
            )
            .bind(req.user_id)
            .bind(&req.text)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?,
        };

        Ok(note_from_row(&row))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_attachment(&self, req: &CreateAttachmentRequest) -> Result<Attachment> {
        let row = sqlx::query(
            r#"
            INSERT INTO note_attachment (note_id, name, size)
            SELECT n.id, $3, $4 FROM note n WHERE n.id = $1 AND n.user_id = $2
            RETURNING id, note_id, name, size, created_at
            "#,
        )
        .bind(req.note_id)
        .bind(req.user_id)
        .bind(&req.name)
        .bind(req.size)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(req.note_id))?;

        Ok(attachment_from_row(&row))
    }

    async fn remove_attachment(
        &self,
        user_id: i64,
        note_id: i64,
        attachment_id: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM note_attachment a
            USING note n
            WHERE a.id = $1 AND a.note_id = $2 AND n.id = a.note_id AND n.user_id = $3
            "#,
        )
        .bind(attachment_id)
        .bind(note_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

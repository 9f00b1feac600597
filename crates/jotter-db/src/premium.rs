//! Premium subscription repository.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use jotter_core::{Error, PremiumLimits, PremiumRepository, Result, Subscription};

/// PostgreSQL implementation of PremiumRepository.
#[derive(Clone)]
pub struct PgPremiumRepository {
    pool: Pool<Postgres>,
}

impl PgPremiumRepository {
    /// Create a new PgPremiumRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert or replace a user's subscription.
    pub async fn upsert_subscription(&self, sub: &Subscription) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users_premium (user_id, status, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                status = EXCLUDED.status,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date
            "#,
        )
        .bind(sub.user_id)
        .bind(sub.status.as_str())
        .bind(sub.start_date)
        .bind(sub.end_date)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Insert or replace a user's premium limits.
    pub async fn upsert_limits(&self, limits: &PremiumLimits) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users_premium_limits
                (user_id, note_max_size, total_max_size, attachments_max_size)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                note_max_size = EXCLUDED.note_max_size,
                total_max_size = EXCLUDED.total_max_size,
                attachments_max_size = EXCLUDED.attachments_max_size
            "#,
        )
        .bind(limits.user_id)
        .bind(limits.note_max_size)
        .bind(limits.total_max_size)
        .bind(limits.attachments_max_size)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl PremiumRepository for PgPremiumRepository {
    async fn subscription(&self, user_id: i64) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            "SELECT user_id, status, start_date, end_date FROM users_premium WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|row| -> Result<Subscription> {
            let status: String = row.get("status");
            Ok(Subscription {
                user_id: row.get("user_id"),
                status: status.parse()?,
                start_date: row.get("start_date"),
                end_date: row.get("end_date"),
            })
        })
        .transpose()
    }

    async fn premium_limits(&self, user_id: i64) -> Result<Option<PremiumLimits>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, note_max_size, total_max_size, attachments_max_size
            FROM users_premium_limits
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| PremiumLimits {
            user_id: row.get("user_id"),
            note_max_size: row.get("note_max_size"),
            total_max_size: row.get("total_max_size"),
            attachments_max_size: row.get("attachments_max_size"),
        }))
    }
}

//! Monthly usage counter repository.
//!
//! One row per user in `notes_quota`. A row whose `period_start` predates the
//! requested period is reset in the same statement that reads or increments
//! it, so there is no separate rollover job.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use tracing::trace;

use jotter_core::{Error, QuotaRepository, Result};

/// PostgreSQL implementation of QuotaRepository.
#[derive(Clone)]
pub struct PgQuotaRepository {
    pool: Pool<Postgres>,
}

impl PgQuotaRepository {
    /// Create a new PgQuotaRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotaRepository for PgQuotaRepository {
    async fn usage(&self, user_id: i64, period: NaiveDate) -> Result<i64> {
        let usage: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO notes_quota (user_id, usage, period_start)
            VALUES ($1, 0, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                usage = CASE
                    WHEN notes_quota.period_start < EXCLUDED.period_start THEN 0
                    ELSE notes_quota.usage
                END,
                period_start = GREATEST(notes_quota.period_start, EXCLUDED.period_start)
            RETURNING usage
            "#,
        )
        .bind(user_id)
        .bind(period)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(user_id, usage_bytes = usage, %period, "Loaded usage record");
        Ok(usage)
    }

    async fn try_add_usage(
        &self,
        user_id: i64,
        period: NaiveDate,
        delta: i64,
        ceiling: i64,
    ) -> Result<Option<i64>> {
        // The conflict branch locks the row, so concurrent increments are
        // serialized and the ceiling guard sees the latest value.
        let usage: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO notes_quota (user_id, usage, period_start)
            SELECT $1, $3, $2
            WHERE $3 <= $4
            ON CONFLICT (user_id) DO UPDATE SET
                usage = CASE
                    WHEN notes_quota.period_start < EXCLUDED.period_start THEN EXCLUDED.usage
                    ELSE notes_quota.usage + EXCLUDED.usage
                END,
                period_start = GREATEST(notes_quota.period_start, EXCLUDED.period_start)
            WHERE CASE
                    WHEN notes_quota.period_start < EXCLUDED.period_start THEN 0
                    ELSE notes_quota.usage
                END + EXCLUDED.usage <= $4
            RETURNING usage
            "#,
        )
        .bind(user_id)
        .bind(period)
        .bind(delta)
        .bind(ceiling)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(usage)
    }
}

//! Airport and city repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::trace;

use jotter_core::{Error, Place, PlaceKind, PlaceQuery, PlaceRepository, Result};

use crate::escape_like;

/// PostgreSQL implementation of PlaceRepository.
#[derive(Clone)]
pub struct PgPlaceRepository {
    pool: Pool<Postgres>,
}

impl PgPlaceRepository {
    /// Create a new PgPlaceRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn place_from_row(row: &PgRow) -> Result<Place> {
    let kind: String = row.get("kind");
    Ok(Place {
        kind: kind
            .parse()
            .map_err(|_| Error::Internal(format!("Unexpected place kind in database: {}", kind)))?,
        code: row.get("code"),
        name: row.get("name"),
        country_code: row.get("country_code"),
        city_code: row.get("city_code"),
    })
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>> {
        let code = query.term.to_ascii_uppercase();
        let prefix = format!("{}%", escape_like(&query.term.to_lowercase()));

        let rows = sqlx::query(
            r#"
            SELECT kind, code, name, country_code, city_code
            FROM place
            WHERE kind = $1
              AND (code = $2 OR lower(name) LIKE $3 ESCAPE '\')
            ORDER BY (code = $2) DESC, name, code
            LIMIT $4
            "#,
        )
        .bind(query.kind.as_str())
        .bind(&code)
        .bind(&prefix)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(
            place_kind = %query.kind,
            term = %query.term,
            result_count = rows.len(),
            "Place search"
        );
        rows.iter().map(place_from_row).collect()
    }

    async fn get(&self, kind: PlaceKind, code: &str) -> Result<Option<Place>> {
        let row = sqlx::query(
            "SELECT kind, code, name, country_code, city_code FROM place WHERE kind = $1 AND code = $2",
        )
        .bind(kind.as_str())
        .bind(code.to_ascii_uppercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(place_from_row).transpose()
    }

    async fn upsert(&self, place: &Place) -> Result<bool> {
        // xmax is 0 only for a freshly inserted tuple.
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO place (kind, code, name, country_code, city_code)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (kind, code) DO UPDATE SET
                name = EXCLUDED.name,
                country_code = EXCLUDED.country_code,
                city_code = EXCLUDED.city_code
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(place.kind.as_str())
        .bind(&place.code)
        .bind(&place.name)
        .bind(&place.country_code)
        .bind(&place.city_code)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(inserted)
    }

    async fn delete(&self, kind: PlaceKind, code: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM place WHERE kind = $1 AND code = $2")
            .bind(kind.as_str())
            .bind(code.to_ascii_uppercase())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

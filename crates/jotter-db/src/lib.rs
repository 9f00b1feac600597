//! # jotter-db
//!
//! PostgreSQL database layer for jotter.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for quota usage, premium subscriptions,
//!   settings, notes and places
//! - Optional routing of quota usage to a separate database
//!
//! ## Example
//!
//! ```rust,ignore
//! use jotter_db::{Database, PlaceKind, PlaceRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/jotter").await?;
//!     let lhr = db.places.get(PlaceKind::Airport, "LHR").await?;
//!     println!("{:?}", lhr);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod places;
pub mod pool;
pub mod premium;
pub mod quota;
pub mod settings;
pub mod test_fixtures;

pub use notes::PgNoteRepository;
pub use places::PgPlaceRepository;
pub use pool::{create_named_pool, create_pool, create_pool_with_config, PoolConfig};
pub use premium::PgPremiumRepository;
pub use quota::PgQuotaRepository;
pub use settings::PgSettingsRepository;

// Re-export core types for convenience
pub use jotter_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Database handle with all repositories.
///
/// Usage counters can live in a separate database (see
/// [`Database::with_quota_pool`]); every other repository uses the main pool.
#[derive(Clone)]
pub struct Database {
    /// The main connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Pool backing `quotas` when it differs from `pool`.
    quota_pool: Option<sqlx::Pool<sqlx::Postgres>>,
    /// Monthly usage counters.
    pub quotas: PgQuotaRepository,
    /// Premium subscriptions and limits.
    pub premium: PgPremiumRepository,
    /// Key/value settings (quota defaults).
    pub settings: PgSettingsRepository,
    /// Notes and attachments.
    pub notes: PgNoteRepository,
    /// Airports and cities.
    pub places: PgPlaceRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            quotas: PgQuotaRepository::new(pool.clone()),
            premium: PgPremiumRepository::new(pool.clone()),
            settings: PgSettingsRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            places: PgPlaceRepository::new(pool.clone()),
            quota_pool: None,
            pool,
        }
    }

    /// Route usage counters to their own pool.
    pub fn with_quota_pool(mut self, pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        self.quotas = PgQuotaRepository::new(pool.clone());
        self.quota_pool = Some(pool);
        self
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Connect the main pool and, when `quota_url` is set and differs from
    /// `url`, a second pool for usage counters.
    pub async fn connect_routed(
        url: &str,
        quota_url: Option<&str>,
        config: PoolConfig,
    ) -> Result<Self> {
        let db = Self::connect_with_config(url, config.clone()).await?;
        match quota_url.filter(|q| !q.is_empty() && *q != url) {
            Some(quota_url) => {
                let quota_pool = create_named_pool("quota", quota_url, config).await?;
                Ok(db.with_quota_pool(quota_pool))
            }
            None => Ok(db),
        }
    }

    /// Run pending migrations on every pool.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        let migrator = sqlx::migrate!("../../migrations");
        for pool in std::iter::once(&self.pool).chain(self.quota_pool.iter()) {
            migrator
                .run(pool)
                .await
                .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        }
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Pool that holds usage counters.
    pub fn quota_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        self.quota_pool.as_ref().unwrap_or(&self.pool)
    }

    /// Whether usage counters live in a separate database.
    pub fn has_separate_quota_pool(&self) -> bool {
        self.quota_pool.is_some()
    }
}

use crate::models::SearchEntry;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// A stored search of a practitioner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLogRecord {
    pub id: Uuid,
    pub user_id: String,
    #[serde(flatten)]
    pub entry: SearchEntry,
}

/// PostgreSQL client for the practitioners' search history
///
/// The history is the one piece of state this service owns: searches are
/// logged as practitioners browse the catalog and read back as an intent
/// signal when scoring listings.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Create a client whose pool only connects on first use.
    ///
    /// Migrations are not run.
    pub fn connect_lazy(database_url: &str, acquire_timeout: Duration) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Log one search of a practitioner
    pub async fn record_search(
        &self,
        user_id: &str,
        entry: SearchEntry,
    ) -> Result<SearchLogRecord, PostgresError> {
        let query = r#"
            INSERT INTO search_logs (id, user_id, city, radius, structure_type, profession, searched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#;

        let id = Uuid::new_v4();
        sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .bind(entry.city.as_deref())
            .bind(entry.radius.map(|r| i32::try_from(r).unwrap_or(i32::MAX)))
            .bind(entry.structure_type.map(|s| s.as_str()))
            .bind(entry.profession.as_deref())
            .bind(entry.searched_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Recorded search {} for {}", id, user_id);

        Ok(SearchLogRecord {
            id,
            user_id: user_id.to_string(),
            entry,
        })
    }

    /// Most recent searches of a practitioner, newest first
    pub async fn recent_searches(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchEntry>, PostgresError> {
        let query = r#"
            SELECT city, radius, structure_type, profession, searched_at
            FROM search_logs
            WHERE user_id = $1
            ORDER BY searched_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let searches: Vec<SearchEntry> = rows.iter().map(search_from_row).collect();

        tracing::debug!("User {} has {} recent searches", user_id, searches.len());

        Ok(searches)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn search_from_row(row: &PgRow) -> SearchEntry {
    let radius: Option<i32> = row.get("radius");
    let structure_type: Option<String> = row.get("structure_type");

    SearchEntry {
        city: row.get("city"),
        radius: radius.and_then(|r| u32::try_from(r).ok()).filter(|r| *r > 0),
        structure_type: structure_type.and_then(|s| s.parse().ok()),
        profession: row.get("profession"),
        searched_at: row.get("searched_at"),
    }
}

//! SQLite cache implementation.
//!
//! A file-based backend for the content cache. Good for:
//! - Local runs that should reuse fetched pages across invocations
//! - Inspecting stored results after a run

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{ExtractionError, Result};
use crate::traits::store::{ContentCache, ResultKind};

/// SQLite-backed content cache over a single `scraped_data` table.
pub struct SqliteCache {
    pool: SqlitePool,
}

fn storage(e: sqlx::Error) -> ExtractionError {
    ExtractionError::Storage(Box::new(e))
}

impl SqliteCache {
    /// Open (and migrate) a database.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./spidermind.db?mode=rwc` - Create if not exists
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(database_url, 5).await
    }

    /// In-memory database (for testing).
    ///
    /// Limited to one connection: every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(storage)?;

        let cache = Self { pool };
        cache.run_migrations().await?;
        Ok(cache)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scraped_data (
                unique_name TEXT PRIMARY KEY,
                url TEXT NOT NULL DEFAULT '',
                raw_data TEXT,
                formatted_data TEXT,
                pagination_data TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ContentCache for SqliteCache {
    async fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let raw: Option<Option<String>> =
            sqlx::query_scalar("SELECT raw_data FROM scraped_data WHERE unique_name = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;

        Ok(raw.flatten().filter(|text| !text.is_empty()))
    }

    async fn write_raw(&self, key: &str, source_url: &str, text: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scraped_data (unique_name, url, raw_data, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(unique_name) DO UPDATE SET
                url = excluded.url,
                raw_data = excluded.raw_data
            "#,
        )
        .bind(key)
        .bind(source_url)
        .bind(text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn write_result(&self, key: &str, kind: ResultKind, value: &Value) -> Result<()> {
        let sql = match kind {
            ResultKind::Extraction => {
                r#"
                INSERT INTO scraped_data (unique_name, formatted_data, created_at)
                VALUES (?, ?, ?)
                ON CONFLICT(unique_name) DO UPDATE SET formatted_data = excluded.formatted_data
                "#
            }
            ResultKind::Pagination => {
                r#"
                INSERT INTO scraped_data (unique_name, pagination_data, created_at)
                VALUES (?, ?, ?)
                ON CONFLICT(unique_name) DO UPDATE SET pagination_data = excluded.pagination_data
                "#
            }
        };

        sqlx::query(sql)
            .bind(key)
            .bind(serde_json::to_string(value)?)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(())
    }

    async fn read_result(&self, key: &str, kind: ResultKind) -> Result<Option<Value>> {
        let sql = match kind {
            ResultKind::Extraction => "SELECT formatted_data FROM scraped_data WHERE unique_name = ?",
            ResultKind::Pagination => {
                "SELECT pagination_data FROM scraped_data WHERE unique_name = ?"
            }
        };

        let stored: Option<Option<String>> = sqlx::query_scalar(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        stored
            .flatten()
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(ExtractionError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_raw_round_trip() {
        let cache = SqliteCache::in_memory().await.unwrap();
        assert_eq!(cache.read_raw("k").await.unwrap(), None);

        cache.write_raw("k", "https://a.com", "# Title").await.unwrap();
        assert_eq!(cache.read_raw("k").await.unwrap(), Some("# Title".into()));

        cache.write_raw("k", "https://a.com", "# New").await.unwrap();
        assert_eq!(cache.read_raw("k").await.unwrap(), Some("# New".into()));
    }

    #[tokio::test]
    async fn test_result_round_trip() {
        let cache = SqliteCache::in_memory().await.unwrap();
        cache.write_raw("k", "https://a.com", "text").await.unwrap();

        let parsed = json!({"listings": [{"title": "Loft", "price": "$900"}]});
        cache
            .write_result("k", ResultKind::Extraction, &parsed)
            .await
            .unwrap();
        cache
            .write_result("k", ResultKind::Pagination, &json!({"page_urls": []}))
            .await
            .unwrap();

        assert_eq!(
            cache.read_result("k", ResultKind::Extraction).await.unwrap(),
            Some(parsed)
        );
        assert_eq!(
            cache.read_result("k", ResultKind::Pagination).await.unwrap(),
            Some(json!({"page_urls": []}))
        );
        assert_eq!(cache.read_raw("k").await.unwrap(), Some("text".into()));
    }

    #[tokio::test]
    async fn test_result_without_raw_row() {
        let cache = SqliteCache::in_memory().await.unwrap();
        cache
            .write_result("orphan", ResultKind::Pagination, &json!({"raw_text": "?"}))
            .await
            .unwrap();

        assert_eq!(cache.read_raw("orphan").await.unwrap(), None);
        assert!(cache
            .read_result("orphan", ResultKind::Pagination)
            .await
            .unwrap()
            .is_some());
    }
}

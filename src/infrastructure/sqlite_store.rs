use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};

use crate::domain::store::KeyValueStore;

#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = if database_url.starts_with("sqlite::memory:") {
            // Each connection to `sqlite::memory:` is its own database, so pin one.
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options
            .connect(database_url)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }
}

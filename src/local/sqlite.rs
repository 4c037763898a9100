use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{LocalStore, LocalStoreError};
use crate::models::timestamp;

/// SQLite-backed local store: one row per key.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and runs migrations.
    pub async fn open(path: &Path) -> Result<Self, LocalStoreError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LocalStoreError::IoError(parent.to_path_buf(), e))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(LocalStoreError::MigrationError)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        sqlx::query(
            r#"
            INSERT INTO local_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(timestamp::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, LocalStoreError> {
        let result = sqlx::query("DELETE FROM local_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct TestContext {
        store: SqliteStore,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_store() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("nested").join("local.db"))
            .await
            .unwrap();
        TestContext {
            store,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_open_creates_table() {
        let ctx = setup_store().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%'",
        )
        .fetch_all(ctx.store.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert!(names.contains(&"local_store"));
    }

    #[tokio::test]
    async fn test_set_get_and_overwrite() {
        let ctx = setup_store().await;
        let store = &ctx.store;

        assert!(store.get("zentra_bookings").await.unwrap().is_none());

        store.set("zentra_bookings", "[]").await.unwrap();
        store
            .set("zentra_bookings", r#"[{"id":"1"}]"#)
            .await
            .unwrap();

        assert_eq!(
            store.get("zentra_bookings").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("local.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.set("zentra_services", "[]").await.unwrap();
            store.pool().close().await;
        }

        let store = SqliteStore::open(&path).await.unwrap();
        assert_eq!(
            store.get("zentra_services").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let ctx = setup_store().await;
        ctx.store.set("key", "[]").await.unwrap();

        assert!(ctx.store.remove("key").await.unwrap());
        assert!(!ctx.store.remove("key").await.unwrap());
    }
}

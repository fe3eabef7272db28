use std::path::Path;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::{create_in_memory_sqlite_pool, create_sqlite_pool, SqlitePool};
use super::backend::{check_key, KeyValueBackend};
use super::errors::RepositoryError;

/// SQLite storage: one row per collection in the `local_state` table
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (and migrate) the database file at `path`
    pub fn open(path: &Path, pool_size: u32) -> Result<Self, RepositoryError> {
        let pool = create_sqlite_pool(path, pool_size)?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self, RepositoryError> {
        let pool = create_in_memory_sqlite_pool()?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueBackend for SqliteBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        check_key(key)?;
        debug!("Loading '{}' from SQLite", key);

        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        check_key(key)?;
        debug!("Saving {} bytes under '{}' in SQLite", value.len(), key);

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO local_state (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }
}

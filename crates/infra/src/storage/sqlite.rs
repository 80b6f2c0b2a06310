//! SQLite-backed key-value store
//!
//! A single `kv_store` table behind an r2d2 pool. Every call runs on the
//! blocking thread pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use boardsync_core::KeyValueStore;
use boardsync_domain::{BoardSyncError, Result as DomainResult};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use tokio::task;
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

type SqlitePool = Pool<SqliteConnectionManager>;

/// Durable [`KeyValueStore`]
pub struct SqliteKeyValueStore {
    pool: Arc<SqlitePool>,
    path: PathBuf,
}

impl SqliteKeyValueStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> DomainResult<Self> {
        let path = path.as_ref().to_path_buf();
        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
        });

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(map_pool_error)?;

        let store = Self { pool: Arc::new(pool), path };
        store.run_migrations()?;

        info!(db_path = %store.path.display(), max_connections = pool_size.max(1), "sqlite store initialised");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_migrations(&self) -> DomainResult<()> {
        let conn = connection(&self.pool)?;
        conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)
    }

    async fn with_connection<T, F>(&self, op: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        task::spawn_blocking(move || -> DomainResult<T> {
            let conn = connection(&pool)?;
            op(&conn).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            conn.query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn delete(&self, key: &str) -> DomainResult<bool> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key]).map(|rows| rows > 0)
        })
        .await
    }
}

fn connection(pool: &SqlitePool) -> DomainResult<PooledConnection<SqliteConnectionManager>> {
    pool.get().map_err(map_pool_error)
}

fn map_sql_error(err: rusqlite::Error) -> BoardSyncError {
    BoardSyncError::from(InfraError::from(err))
}

fn map_pool_error(err: r2d2::Error) -> BoardSyncError {
    BoardSyncError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> BoardSyncError {
    if err.is_cancelled() {
        BoardSyncError::Internal("blocking task cancelled".into())
    } else {
        BoardSyncError::Internal(format!("blocking task failed: {err}"))
    }
}

//! Whole-snapshot persistence of mode stores.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use locations::Mode;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::store::TipStore;

/// Loads and saves whole mode stores.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Load the saved store for a mode, if one was saved.
    async fn load(&self, mode: Mode) -> Result<Option<TipStore>>;

    /// Replace the saved store for a mode.
    async fn save(&self, mode: Mode, store: &TipStore) -> Result<()>;
}

/// SQLite persistence: one JSON snapshot row per mode.
#[derive(Debug, Clone)]
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Default pool size. Every mode serializes its own writes, so a few
    /// connections are plenty.
    const DEFAULT_POOL_SIZE: u32 = 4;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases (`sqlite::memory:`) need a pool size of 1, since
    /// every connection gets its own database.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Persistence for SqlitePersistence {
    async fn load(&self, mode: Mode) -> Result<Option<TipStore>> {
        let body = sqlx::query_scalar::<_, String>(
            r#"
            SELECT body
            FROM holocron_snapshots
            WHERE mode = ?
            "#,
        )
        .bind(mode.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match body {
            Some(body) => {
                debug!(mode = %mode, bytes = body.len(), "Loaded snapshot");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, mode: Mode, store: &TipStore) -> Result<()> {
        let body = serde_json::to_string(store)?;

        sqlx::query(
            r#"
            INSERT INTO holocron_snapshots (mode, body)
            VALUES (?, ?)
            ON CONFLICT(mode) DO UPDATE SET
                body = excluded.body,
                updated_at = datetime('now')
            "#,
        )
        .bind(mode.as_str())
        .bind(&body)
        .execute(&self.pool)
        .await?;

        debug!(mode = %mode, bytes = body.len(), "Saved snapshot");
        Ok(())
    }
}

/// In-memory persistence for tests. Snapshots go through JSON like the
/// SQLite backend.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    snapshots: Mutex<HashMap<Mode, String>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn load(&self, mode: Mode) -> Result<Option<TipStore>> {
        let snapshots = self.snapshots.lock().await;
        match snapshots.get(&mode) {
            Some(body) => Ok(Some(serde_json::from_str(body)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, mode: Mode, store: &TipStore) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(format!("saves to {} are disabled", mode)));
        }
        let body = serde_json::to_string(store)?;
        self.snapshots.lock().await.insert(mode, body);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::StoreShape;
    use holocron_core::{Squad, Tip};

    async fn test_db() -> SqlitePersistence {
        let db = SqlitePersistence::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn counter_store() -> TipStore {
        let mut store = StoreShape::from_json(r#"{"squads": true}"#).unwrap().build();
        let mut squad = Squad::new("jmk", "Jedi Master Kenobi", "trich", None);
        squad.tips.push(Tip::counter("mirror", "go fast", Some("TW"), "uaq", None));
        store.squads_mut().unwrap().add_squad(squad).unwrap();
        store
    }

    #[tokio::test]
    async fn test_sqlite_snapshot_upsert() {
        let db = test_db().await;
        assert!(db.load(Mode::Counter).await.unwrap().is_none());

        let store = counter_store();
        db.save(Mode::Counter, &store).await.unwrap();
        assert_eq!(db.load(Mode::Counter).await.unwrap(), Some(store.clone()));

        let empty = StoreShape::from_json(r#"{"squads": true}"#).unwrap().build();
        db.save(Mode::Counter, &empty).await.unwrap();
        assert_eq!(db.load(Mode::Counter).await.unwrap(), Some(empty));
        assert!(db.load(Mode::War).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_persistence_can_fail_saves() {
        let persistence = MemoryPersistence::new();
        let store = counter_store();

        persistence.save(Mode::Counter, &store).await.unwrap();
        assert_eq!(persistence.save_count(), 1);

        persistence.set_fail_saves(true);
        let err = persistence.save(Mode::Counter, &store).await.unwrap_err();
        assert!(matches!(err, StorageError::Rejected(_)));
        assert_eq!(persistence.save_count(), 1);
        assert_eq!(persistence.load(Mode::Counter).await.unwrap(), Some(store));
    }
}

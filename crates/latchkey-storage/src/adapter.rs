// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use latchkey_config::model::StorageConfig;
use latchkey_core::{LatchkeyError, StorageAdapter};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Whether the configured database file already exists on disk.
    pub fn database_exists(&self) -> bool {
        std::path::Path::new(&self.config.database_path).exists()
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, LatchkeyError> {
        self.db.get().ok_or_else(|| {
            LatchkeyError::persistence("storage not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), LatchkeyError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| LatchkeyError::persistence("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LatchkeyError> {
        queries::kv::get(self.db()?, key).await
    }

    async fn commit(
        &self,
        entries: Vec<(String, String)>,
        removals: Vec<String>,
    ) -> Result<(), LatchkeyError> {
        queries::kv::commit(self.db()?, entries, removals).await
    }

    async fn close(&self) -> Result<(), LatchkeyError> {
        let Some(db) = self.db.get() else {
            return Ok(());
        };
        if self.config.wal_mode {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

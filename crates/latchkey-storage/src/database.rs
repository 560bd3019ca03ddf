// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use latchkey_core::LatchkeyError;
use tracing::debug;

use crate::migrations;

/// A migrated SQLite database. This handle is the single writer.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, LatchkeyError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(LatchkeyError::persistence)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;
        Self::prepare(conn, wal_mode).await
    }

    #[cfg(test)]
    pub(crate) async fn open_in_memory() -> Result<Self, LatchkeyError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(map_tr_err)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: tokio_rusqlite::Connection, wal_mode: bool) -> Result<Self, LatchkeyError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.busy_timeout(Duration::from_secs(5))?;
            // Freed pages are overwritten so deleted ciphertext does not linger.
            conn.pragma_update(None, "secure_delete", "ON")?;
            if wal_mode {
                let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get(0)
                })?;
                debug!(journal_mode = %mode, "journal mode set");
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            } else {
                conn.pragma_update(None, "synchronous", "FULL")?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        let applied = conn
            .call(|conn| -> Result<usize, refinery::Error> { migrations::run_migrations(conn) })
            .await
            .map_err(map_tr_err)?;
        debug!(applied, "migrations complete");

        Ok(Self { conn })
    }

    /// Returns the underlying connection. All access goes through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

/// Convert tokio-rusqlite errors to [`LatchkeyError::Persistence`].
pub fn map_tr_err<E: std::fmt::Display>(e: E) -> LatchkeyError {
    LatchkeyError::persistence(format!("database error: {e}"))
}

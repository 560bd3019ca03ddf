// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value reads and transactional multi-key writes.

use chrono::Utc;
use latchkey_core::LatchkeyError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Read a single key.
pub async fn get(db: &Database, key: &str) -> Result<Option<String>, LatchkeyError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT value FROM vault_kv WHERE key = ?1")?;
            let result = stmt.query_row(params![key], |row| row.get(0));
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Upsert `entries` and delete `removals` inside one transaction.
///
/// Either all changes are committed or, on any failure, none are.
pub async fn commit(
    db: &Database,
    entries: Vec<(String, String)>,
    removals: Vec<String>,
) -> Result<(), LatchkeyError> {
    if entries.is_empty() && removals.is_empty() {
        return Ok(());
    }
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut upsert = tx.prepare(
                    "INSERT INTO vault_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                )?;
                for (key, value) in &entries {
                    upsert.execute(params![key, value, now])?;
                }
                let mut delete = tx.prepare("DELETE FROM vault_kv WHERE key = ?1")?;
                for key in &removals {
                    delete.execute(params![key])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

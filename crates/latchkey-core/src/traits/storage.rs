// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for key-value persistence backends (SQLite, memory).

use async_trait::async_trait;

use crate::error::LatchkeyError;

/// Adapter for the vault's private key-value persistence.
///
/// Values are opaque strings owned by the vault; the backend never
/// interprets them. [`commit`](StorageAdapter::commit) is the only write
/// path and must be atomic: either every upsert and removal lands or none
/// does.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Initializes the backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), LatchkeyError>;

    /// Reads one key.
    async fn get(&self, key: &str) -> Result<Option<String>, LatchkeyError>;

    /// Upserts `entries` and deletes `removals` in a single transaction.
    async fn commit(
        &self,
        entries: Vec<(String, String)>,
        removals: Vec<String>,
    ) -> Result<(), LatchkeyError>;

    /// Upserts all entries in a single transaction.
    async fn put_all(&self, entries: Vec<(String, String)>) -> Result<(), LatchkeyError> {
        self.commit(entries, Vec::new()).await
    }

    /// Flushes pending writes and releases resources.
    async fn close(&self) -> Result<(), LatchkeyError>;
}

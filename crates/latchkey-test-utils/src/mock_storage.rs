// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapters for deterministic tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use latchkey_core::{LatchkeyError, StorageAdapter};

/// A key-value backend held entirely in memory.
///
/// Besides the adapter interface it exposes synchronous helpers so tests can
/// inspect and tamper with persisted values directly.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Overwrite `key` without going through the adapter.
    pub fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Remove `key` without going through the adapter.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.lock().remove(key)
    }

    /// Number of successful commits.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Every persisted value concatenated, for plaintext-leak assertions.
    pub fn dump(&self) -> String {
        self.lock()
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn initialize(&self) -> Result<(), LatchkeyError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LatchkeyError> {
        Ok(self.value(key))
    }

    async fn commit(
        &self,
        entries: Vec<(String, String)>,
        removals: Vec<String>,
    ) -> Result<(), LatchkeyError> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert(key, value);
        }
        for key in removals {
            map.remove(&key);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), LatchkeyError> {
        Ok(())
    }
}

/// Wraps a [`MemoryStorage`] and fails writes while the switch is on.
///
/// A failed write leaves the inner store untouched, like a rolled-back
/// transaction.
#[derive(Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn injected(op: &str) -> LatchkeyError {
        LatchkeyError::persistence(std::io::Error::other(format!("injected {op} failure")))
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    fn name(&self) -> &str {
        "failing"
    }

    async fn initialize(&self) -> Result<(), LatchkeyError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LatchkeyError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        self.inner.get(key).await
    }

    async fn commit(
        &self,
        entries: Vec<(String, String)>,
        removals: Vec<String>,
    ) -> Result<(), LatchkeyError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            tracing::debug!(entries = entries.len(), removals = removals.len(), "dropping write");
            return Err(Self::injected("write"));
        }
        self.inner.commit(entries, removals).await
    }

    async fn close(&self) -> Result<(), LatchkeyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_round_trips_and_counts_writes() {
        let storage = MemoryStorage::new();
        storage
            .put_all(vec![("a".into(), "1".into()), ("b".into(), "2".into())])
            .await
            .unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get("missing").await.unwrap(), None);
        assert_eq!(storage.write_count(), 1);

        storage
            .commit(vec![("c".into(), "3".into())], vec!["a".into()])
            .await
            .unwrap();
        assert_eq!(storage.value("a"), None);
        assert_eq!(storage.value("c").as_deref(), Some("3"));
        assert_eq!(storage.write_count(), 2);
    }

    #[tokio::test]
    async fn failing_storage_leaves_inner_untouched() {
        let storage = FailingStorage::new();
        storage.put_all(vec![("k".into(), "old".into())]).await.unwrap();

        storage.set_fail_writes(true);
        let err = storage
            .put_all(vec![("k".into(), "new".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, LatchkeyError::Persistence { .. }));
        assert_eq!(storage.inner().value("k").as_deref(), Some("old"));
        assert!(storage.commit(Vec::new(), vec!["k".into()]).await.is_err());
        assert_eq!(storage.inner().value("k").as_deref(), Some("old"));

        storage.set_fail_reads(true);
        assert!(storage.get("k").await.is_err());
    }
}

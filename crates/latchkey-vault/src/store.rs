// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The encrypted credential collection.
//!
//! Each record lives in its own `credential/<id>` entry so that damage to one
//! record never spills into another. `credentials` holds the ids in insertion
//! order and `credentialSeq` the last issued id. Every mutation writes the
//! record entry, the index and the sequence in a single storage transaction.
//! Operations that need plaintext take a [`SessionKey`], so they cannot be
//! reached without a session.

use std::sync::Arc;

use latchkey_core::{CredentialId, LatchkeyError, StorageAdapter};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::keys;
use crate::record::{CredentialListing, CredentialSummary, DecryptedCredential, StoredCredential};
use crate::session::SessionKey;

pub struct CredentialStore {
    storage: Arc<dyn StorageAdapter>,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Encrypt and append a credential, returning its new id.
    pub async fn add(
        &self,
        key: &SessionKey,
        site: &str,
        username: &str,
        secret: &SecretString,
    ) -> Result<CredentialId, LatchkeyError> {
        let site = site.trim();
        let username = username.trim();
        if site.is_empty() {
            return Err(LatchkeyError::EmptyInput { field: "site" });
        }
        if username.is_empty() {
            return Err(LatchkeyError::EmptyInput { field: "username" });
        }
        if secret.expose_secret().is_empty() {
            return Err(LatchkeyError::EmptyInput { field: "secret" });
        }

        let _guard = self.write_lock.lock().await;
        let mut index = self.load_index().await?;
        let last_issued = self.load_sequence().await?;
        let highest = index.iter().map(|id| id.0).max().unwrap_or(0);
        let id = CredentialId(
            last_issued
                .max(highest)
                .checked_add(1)
                .ok_or_else(|| LatchkeyError::Internal("credential id space exhausted".to_string()))?,
        );

        let record = StoredCredential::seal(
            key,
            id,
            site.to_string(),
            username.to_string(),
            secret.expose_secret().as_bytes(),
        )?;
        let encoded = serde_json::to_string(&record)
            .map_err(|e| LatchkeyError::Internal(format!("failed to encode credential: {e}")))?;
        index.push(id);
        self.persist(&index, id.0, vec![(keys::credential(id), encoded)], Vec::new())
            .await?;

        debug!(%id, site, "credential added");
        Ok(id)
    }

    /// Decrypt every record, most recent first.
    ///
    /// Records that cannot be decoded or fail authentication are left out of
    /// `entries` and reported in `unreadable`; they never abort the listing.
    pub async fn list(&self, key: &SessionKey) -> Result<CredentialListing, LatchkeyError> {
        let mut listing = CredentialListing::default();
        for id in self.load_index().await?.into_iter().rev() {
            match self.load_record(id).await.and_then(|record| record.open(key)) {
                Ok(entry) => listing.entries.push(entry),
                Err(err @ LatchkeyError::VaultCorrupted { .. }) => {
                    warn!(%id, error = %err, "credential failed to decrypt");
                    listing.unreadable.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(listing)
    }

    /// Decrypt one record. `Ok(None)` when no record has this id.
    pub async fn get(
        &self,
        key: &SessionKey,
        id: CredentialId,
    ) -> Result<Option<DecryptedCredential>, LatchkeyError> {
        if !self.load_index().await?.contains(&id) {
            return Ok(None);
        }
        self.load_record(id).await?.open(key).map(Some)
    }

    /// Remove a record. Returns whether anything was removed; an unknown id
    /// is a no-op and writes nothing.
    pub async fn delete(&self, id: CredentialId) -> Result<bool, LatchkeyError> {
        let _guard = self.write_lock.lock().await;
        let mut index = self.load_index().await?;
        let before = index.len();
        index.retain(|entry| *entry != id);
        if index.len() == before {
            debug!(%id, "delete of unknown credential ignored");
            return Ok(false);
        }

        let last_issued = self.load_sequence().await?;
        self.persist(&index, last_issued.max(id.0), Vec::new(), vec![keys::credential(id)])
            .await?;
        debug!(%id, "credential deleted");
        Ok(true)
    }

    /// Metadata of every decodable record, most recent first. Decrypts nothing.
    pub async fn summaries(&self) -> Result<Vec<CredentialSummary>, LatchkeyError> {
        let mut summaries = Vec::new();
        for id in self.load_index().await?.into_iter().rev() {
            match self.load_record(id).await {
                Ok(record) => summaries.push(record.summary()),
                Err(err @ LatchkeyError::VaultCorrupted { .. }) => {
                    warn!(%id, error = %err, "credential record unreadable");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(summaries)
    }

    async fn load_index(&self) -> Result<Vec<CredentialId>, LatchkeyError> {
        match self.storage.get(keys::CREDENTIALS).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| LatchkeyError::StateCorrupted(format!("credential index: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Read and decode one record entry. Damage confined to the entry is
    /// `VaultCorrupted` for `id`; backend failures pass through.
    async fn load_record(&self, id: CredentialId) -> Result<StoredCredential, LatchkeyError> {
        let corrupted = |reason: String| LatchkeyError::VaultCorrupted { id, reason };
        let raw = self
            .storage
            .get(&keys::credential(id))
            .await?
            .ok_or_else(|| corrupted("record missing".to_string()))?;
        let record: StoredCredential =
            serde_json::from_str(&raw).map_err(|e| corrupted(format!("malformed record: {e}")))?;
        if record.id != id {
            return Err(corrupted(format!("record claims id {}", record.id)));
        }
        Ok(record)
    }

    async fn load_sequence(&self) -> Result<u64, LatchkeyError> {
        match self.storage.get(keys::CREDENTIAL_SEQ).await? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| LatchkeyError::StateCorrupted(format!("credential sequence `{raw}`"))),
            None => Ok(0),
        }
    }

    async fn persist(
        &self,
        index: &[CredentialId],
        sequence: u64,
        mut entries: Vec<(String, String)>,
        removals: Vec<String>,
    ) -> Result<(), LatchkeyError> {
        let encoded = serde_json::to_string(index)
            .map_err(|e| LatchkeyError::Internal(format!("failed to encode credential index: {e}")))?;
        entries.push((keys::CREDENTIALS.to_string(), encoded));
        entries.push((keys::CREDENTIAL_SEQ.to_string(), sequence.to_string()));
        self.storage.commit(entries, removals).await
    }
}

// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault facade: one optional session in front of the auth gate and the
//! credential store.
//!
//! A `Vault` starts locked. [`Vault::authenticate`] opens a session and
//! [`Vault::lock`] (or dropping the vault) destroys it together with its key.

use std::sync::Arc;

use latchkey_config::model::VaultConfig;
use latchkey_core::{CredentialId, LatchkeyError, StorageAdapter};
use secrecy::SecretString;
use tracing::info;

use crate::auth::{AuthGate, AuthOutcome, AuthStatus};
use crate::record::{CredentialListing, CredentialSummary, DecryptedCredential};
use crate::session::{Session, SessionKey};
use crate::store::CredentialStore;

pub struct Vault {
    storage: Arc<dyn StorageAdapter>,
    gate: AuthGate,
    store: CredentialStore,
    session: Option<Session>,
}

impl Vault {
    /// Build a locked vault over an initialized storage backend.
    pub fn new(storage: Arc<dyn StorageAdapter>, config: &VaultConfig) -> Self {
        Self {
            gate: AuthGate::new(storage.clone(), config.clone()),
            store: CredentialStore::new(storage.clone()),
            storage,
            session: None,
        }
    }

    /// Whether a master passphrase has been registered.
    pub async fn exists(&self) -> Result<bool, LatchkeyError> {
        self.gate.is_registered().await
    }

    /// Register on first run, otherwise verify. Any previous session is
    /// destroyed first, so a failed attempt always leaves the vault locked.
    pub async fn authenticate(
        &mut self,
        passphrase: &SecretString,
    ) -> Result<AuthOutcome, LatchkeyError> {
        self.session = None;
        let (session, outcome) = self.gate.register_or_verify(passphrase).await?;
        self.session = Some(session);
        Ok(outcome)
    }

    /// Destroy the session key. Returns whether a session was open.
    pub fn lock(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!(opened_at = %session.opened_at(), "vault locked");
                true
            }
            None => false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    fn key(&self) -> Result<&SessionKey, LatchkeyError> {
        self.session
            .as_ref()
            .map(Session::key)
            .ok_or(LatchkeyError::Locked)
    }

    pub async fn add(
        &self,
        site: &str,
        username: &str,
        secret: &SecretString,
    ) -> Result<CredentialId, LatchkeyError> {
        self.store.add(self.key()?, site, username, secret).await
    }

    pub async fn list(&self) -> Result<CredentialListing, LatchkeyError> {
        self.store.list(self.key()?).await
    }

    pub async fn get(&self, id: CredentialId) -> Result<Option<DecryptedCredential>, LatchkeyError> {
        self.store.get(self.key()?, id).await
    }

    /// Works while locked; deletion touches no secret material.
    pub async fn delete(&self, id: CredentialId) -> Result<bool, LatchkeyError> {
        self.store.delete(id).await
    }

    /// Record metadata, most recent first. Works while locked.
    pub async fn summaries(&self) -> Result<Vec<CredentialSummary>, LatchkeyError> {
        self.store.summaries().await
    }

    pub async fn auth_status(&self) -> Result<AuthStatus, LatchkeyError> {
        self.gate.status().await
    }

    /// Lock and release the storage backend.
    pub async fn close(mut self) -> Result<(), LatchkeyError> {
        self.lock();
        self.storage.close().await
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("storage", &self.storage.name())
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}

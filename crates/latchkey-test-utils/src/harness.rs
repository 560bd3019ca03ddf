// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test environment for end-to-end vault tests.
//!
//! `TestEnv` owns a temp directory holding the SQLite database and a
//! [`LatchkeyConfig`] pointing at it, with Argon2 costs low enough to keep
//! a test suite fast.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use latchkey_config::model::{LatchkeyConfig, SiteOverrideConfig, StorageConfig, VaultConfig};
use latchkey_core::{LatchkeyError, StorageAdapter};
use latchkey_storage::SqliteStorage;

/// Vault settings with the cheapest Argon2id parameters the crate accepts.
///
/// These bypass config validation on purpose; never use them outside tests.
pub fn test_vault_config() -> VaultConfig {
    VaultConfig {
        kdf_memory_cost: 8 * 1024,
        kdf_iterations: 1,
        kdf_parallelism: 1,
        ..VaultConfig::default()
    }
}

/// Builder for [`TestEnv`].
pub struct TestEnvBuilder {
    vault: VaultConfig,
    overrides: Vec<SiteOverrideConfig>,
    same_origin_only: bool,
}

impl TestEnvBuilder {
    fn new() -> Self {
        Self {
            vault: test_vault_config(),
            overrides: Vec::new(),
            same_origin_only: true,
        }
    }

    /// Set the failure threshold and base lockout.
    pub fn with_lockout(mut self, max_failed_attempts: u32, lockout_secs: u64) -> Self {
        self.vault.max_failed_attempts = max_failed_attempts;
        self.vault.lockout_secs = lockout_secs;
        self
    }

    /// Add a `[[autofill.overrides]]` entry.
    pub fn with_override(mut self, host: &str, identity: Option<&str>, secret: Option<&str>) -> Self {
        self.overrides.push(SiteOverrideConfig {
            host: host.to_string(),
            identity: identity.map(str::to_string),
            secret: secret.map(str::to_string),
        });
        self
    }

    /// Allow filling frames whose hostname differs from the top frame.
    pub fn allow_cross_origin(mut self) -> Self {
        self.same_origin_only = false;
        self
    }

    pub fn build(self) -> Result<TestEnv, LatchkeyError> {
        let dir = tempfile::TempDir::new().map_err(LatchkeyError::persistence)?;
        let db_path = dir.path().join("vault.db");

        let mut config = LatchkeyConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        config.vault = self.vault;
        config.autofill.overrides = self.overrides;
        config.autofill.same_origin_only = self.same_origin_only;

        Ok(TestEnv { dir, config })
    }
}

/// A temp directory plus a config whose database lives inside it.
///
/// The directory is removed when the value is dropped.
pub struct TestEnv {
    dir: tempfile::TempDir,
    pub config: LatchkeyConfig,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    pub fn new() -> Result<Self, LatchkeyError> {
        Self::builder().build()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.database_path)
    }

    /// Open and initialize the SQLite backend for this environment.
    pub async fn storage(&self) -> Result<Arc<dyn StorageAdapter>, LatchkeyError> {
        let storage = SqliteStorage::new(self.config.storage.clone());
        storage.initialize().await?;
        Ok(Arc::new(storage))
    }
}

// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Latchkey vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Latchkey configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LatchkeyConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key derivation and authentication settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Autofill targeting settings.
    #[serde(default)]
    pub autofill: AutofillConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Log level for the `latchkey` targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("latchkey").join("vault.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("latchkey-vault.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Key derivation and authentication gate configuration.
///
/// KDF parameters only apply when a vault is first created; an existing
/// vault keeps the parameters it was registered with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// Consecutive failed authentications before backoff starts. 0 disables it.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// Initial lockout in seconds, doubled for each further failure.
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            max_failed_attempts: default_max_failed_attempts(),
            lockout_secs: default_lockout_secs(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_lockout_secs() -> u64 {
    30
}

/// Autofill targeting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutofillConfig {
    /// Apply the built-in site overrides shipped with Latchkey.
    #[serde(default = "default_true")]
    pub builtin_overrides: bool,

    /// Only fill frames served from the same host as the top-level page.
    #[serde(default = "default_true")]
    pub same_origin_only: bool,

    /// User-defined site overrides; these win over built-ins for the same host.
    #[serde(default)]
    pub overrides: Vec<SiteOverrideConfig>,
}

impl Default for AutofillConfig {
    fn default() -> Self {
        Self {
            builtin_overrides: true,
            same_origin_only: true,
            overrides: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One `[[autofill.overrides]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SiteOverrideConfig {
    /// Hostname; also matches its subdomains.
    pub host: String,

    /// Selector for the identity field (`#id` or `name=value`).
    #[serde(default)]
    pub identity: Option<String>,

    /// Selector for the secret field (`#id` or `name=value`).
    #[serde(default)]
    pub secret: Option<String>,
}

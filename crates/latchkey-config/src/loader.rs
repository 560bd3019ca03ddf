// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./latchkey.toml` > `~/.config/latchkey/latchkey.toml` >
//! `/etc/latchkey/latchkey.toml` with environment variable overrides via `LATCHKEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LatchkeyConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/latchkey/latchkey.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "latchkey.toml";

/// User config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("latchkey").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/latchkey/latchkey.toml` (system-wide)
/// 3. `~/.config/latchkey/latchkey.toml` (user XDG config)
/// 4. `./latchkey.toml` (local directory)
/// 5. `LATCHKEY_*` environment variables
pub fn load_config() -> Result<LatchkeyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LatchkeyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LatchkeyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `LATCHKEY_VAULT_KDF_MEMORY_COST`
/// must map to `vault.kdf_memory_cost`, not `vault.kdf.memory.cost`.
/// `LATCHKEY_VAULT_KEY` carries the passphrase and is not a config key.
fn env_provider() -> Env {
    Env::prefixed("LATCHKEY_")
        .ignore(&["VAULT_KEY"])
        .map(|key| {
            let key_str = key.as_str();
            let mapped = key_str
                .replacen("general_", "general.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1)
                .replacen("autofill_", "autofill.", 1);
            mapped.into()
        })
}

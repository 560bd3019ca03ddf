// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes:
//! KDF cost floors, log levels, and the shape of site override selectors.

use std::collections::HashSet;

use latchkey_core::FieldSelector;

use crate::diagnostic::ConfigError;
use crate::model::LatchkeyConfig;

/// Lowest Argon2id memory cost accepted from configuration (KiB).
pub const MIN_KDF_MEMORY_COST: u32 = 32768;

/// Lowest Argon2id iteration count accepted from configuration.
pub const MIN_KDF_ITERATIONS: u32 = 2;

/// Highest lane count Argon2id supports.
pub const MAX_KDF_PARALLELISM: u32 = 0x00FF_FFFF;

/// Argon2id needs at least this much memory (KiB) for every lane.
const KDF_MEMORY_PER_LANE: u64 = 8;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LatchkeyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level `{}` is not one of {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.vault.kdf_memory_cost < MIN_KDF_MEMORY_COST {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_memory_cost must be at least {MIN_KDF_MEMORY_COST} (32 MiB), got {}",
                config.vault.kdf_memory_cost
            ),
        });
    }

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    let lanes = config.vault.kdf_parallelism;
    if !(1..=MAX_KDF_PARALLELISM).contains(&lanes) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_parallelism must be between 1 and {MAX_KDF_PARALLELISM}, got {lanes}"
            ),
        });
    } else if u64::from(config.vault.kdf_memory_cost) < KDF_MEMORY_PER_LANE * u64::from(lanes) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_memory_cost must be at least {KDF_MEMORY_PER_LANE} KiB per lane \
                 ({} KiB for {lanes} lanes), got {}",
                KDF_MEMORY_PER_LANE * u64::from(lanes),
                config.vault.kdf_memory_cost
            ),
        });
    }

    if config.vault.max_failed_attempts > 0 && config.vault.lockout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.lockout_secs must be positive when max_failed_attempts is set"
                .to_string(),
        });
    }

    let mut seen_hosts = HashSet::new();
    for (i, entry) in config.autofill.overrides.iter().enumerate() {
        let host = entry.host.trim().to_ascii_lowercase();
        if host.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("autofill.overrides[{i}].host must not be empty"),
            });
        } else if !seen_hosts.insert(host.clone()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate autofill override for host `{host}`"),
            });
        }

        if entry.identity.is_none() && entry.secret.is_none() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "autofill.overrides[{i}] must set at least one of `identity` or `secret`"
                ),
            });
        }

        for (slot, selector) in [("identity", &entry.identity), ("secret", &entry.secret)] {
            if let Some(selector) = selector
                && let Err(e) = selector.parse::<FieldSelector>()
            {
                errors.push(ConfigError::Validation {
                    message: format!("autofill.overrides[{i}].{slot}: {e}"),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

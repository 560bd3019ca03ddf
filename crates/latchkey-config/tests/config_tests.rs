// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Latchkey configuration system.

use latchkey_config::diagnostic::ConfigError;
use latchkey_config::model::LatchkeyConfig;
use latchkey_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use serial_test::serial;

#[test]
fn valid_toml_deserializes_into_latchkey_config() {
    let toml = r##"
[general]
log_level = "debug"

[storage]
database_path = "/tmp/latchkey-test.db"
wal_mode = false

[vault]
kdf_memory_cost = 131072
kdf_iterations = 4
kdf_parallelism = 2
max_failed_attempts = 3
lockout_secs = 10

[autofill]
builtin_overrides = false
same_origin_only = false

[[autofill.overrides]]
host = "login.example.com"
identity = "#account"
secret = "name=passwd"
"##;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/latchkey-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.vault.kdf_memory_cost, 131072);
    assert_eq!(config.vault.kdf_iterations, 4);
    assert_eq!(config.vault.kdf_parallelism, 2);
    assert_eq!(config.vault.max_failed_attempts, 3);
    assert_eq!(config.vault.lockout_secs, 10);
    assert!(!config.autofill.builtin_overrides);
    assert!(!config.autofill.same_origin_only);
    assert_eq!(config.autofill.overrides.len(), 1);
    assert_eq!(config.autofill.overrides[0].host, "login.example.com");
    assert_eq!(config.autofill.overrides[0].identity.as_deref(), Some("#account"));
    assert_eq!(config.autofill.overrides[0].secret.as_deref(), Some("name=passwd"));
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    let defaults = LatchkeyConfig::default();
    assert_eq!(config.vault.kdf_memory_cost, defaults.vault.kdf_memory_cost);
    assert_eq!(config.vault.max_failed_attempts, 5);
    assert!(config.autofill.builtin_overrides);
    assert!(config.autofill.same_origin_only);
    assert!(config.storage.database_path.ends_with("vault.db"));
}

#[test]
fn unknown_field_in_vault_is_suggested() {
    let toml = r#"
[vault]
kdf_iteratons = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "kdf_iteratons");
            assert_eq!(suggestion.as_deref(), Some("kdf_iterations"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[sync]
remote = "https://example.com"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[vault]
kdf_iterations = "three"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_runs_after_successful_parse() {
    let toml = r#"
[vault]
kdf_memory_cost = 1024
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
#[serial]
fn env_var_overrides_file_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latchkey.toml");
    std::fs::write(&path, "[vault]\nlockout_secs = 10\n").unwrap();

    // SAFETY: test-only env mutation, serialized with #[serial].
    unsafe { std::env::set_var("LATCHKEY_VAULT_LOCKOUT_SECS", "90") };
    let result = load_and_validate_path(&path);
    unsafe { std::env::remove_var("LATCHKEY_VAULT_LOCKOUT_SECS") };

    let config = result.expect("config should load");
    assert_eq!(config.vault.lockout_secs, 90);
}

#[test]
#[serial]
fn passphrase_env_var_is_not_a_config_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latchkey.toml");
    std::fs::write(&path, "").unwrap();

    unsafe { std::env::set_var("LATCHKEY_VAULT_KEY", "hunter2") };
    let result = load_and_validate_path(&path);
    unsafe { std::env::remove_var("LATCHKEY_VAULT_KEY") };

    assert!(result.is_ok(), "LATCHKEY_VAULT_KEY must be ignored: {result:?}");
}

// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase and secret acquisition via TTY prompt, environment, or stdin.

use std::io::{BufRead, IsTerminal};

use latchkey_core::LatchkeyError;
use secrecy::SecretString;

/// The environment variable name for providing the master passphrase.
pub const VAULT_KEY_ENV_VAR: &str = "LATCHKEY_VAULT_KEY";

fn from_env() -> Option<SecretString> {
    match std::env::var(VAULT_KEY_ENV_VAR) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => None,
    }
}

fn read_hidden(label: &str) -> Result<String, LatchkeyError> {
    rpassword::prompt_password(label)
        .map_err(|e| LatchkeyError::Internal(format!("failed to read from terminal: {e}")))
}

fn no_source() -> LatchkeyError {
    LatchkeyError::Config(format!(
        "no passphrase provided; set {VAULT_KEY_ENV_VAR} or run interactively"
    ))
}

/// Get the master passphrase.
///
/// Priority:
/// 1. `LATCHKEY_VAULT_KEY` environment variable (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_vault_passphrase() -> Result<SecretString, LatchkeyError> {
    if let Some(key) = from_env() {
        return Ok(key);
    }

    if std::io::stdin().is_terminal() {
        let passphrase = read_hidden("Master passphrase: ")?;
        if passphrase.is_empty() {
            return Err(LatchkeyError::EmptyInput { field: "passphrase" });
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(no_source())
}

/// Get a new master passphrase, prompting twice on a TTY.
pub fn get_vault_passphrase_with_confirm() -> Result<SecretString, LatchkeyError> {
    // Env var does not need confirmation.
    if let Some(key) = from_env() {
        return Ok(key);
    }

    if std::io::stdin().is_terminal() {
        let first = read_hidden("New master passphrase: ")?;
        let second = read_hidden("Confirm master passphrase: ")?;
        if first != second {
            return Err(LatchkeyError::Config("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(LatchkeyError::EmptyInput { field: "passphrase" });
        }
        return Ok(SecretString::from(first));
    }

    Err(no_source())
}

/// Read a credential secret: hidden prompt on a TTY, otherwise the first
/// line of `reader` with its line ending stripped.
pub fn read_secret<R: BufRead>(from_stdin: bool, reader: R) -> Result<SecretString, LatchkeyError> {
    if !from_stdin && std::io::stdin().is_terminal() {
        return Ok(SecretString::from(read_hidden("Secret: ")?));
    }
    read_secret_line(reader)
}

fn read_secret_line<R: BufRead>(mut reader: R) -> Result<SecretString, LatchkeyError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| LatchkeyError::Internal(format!("failed to read secret: {e}")))?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Err(LatchkeyError::EmptyInput { field: "secret" });
    }
    Ok(SecretString::from(trimmed.to_string()))
}

// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Latchkey vault.

use std::time::Duration;

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::types::CredentialId;

/// The primary error type used across vault, storage, and autofill operations.
#[derive(Debug, Error)]
pub enum LatchkeyError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required input (passphrase, site, username, secret) was empty.
    #[error("{field} must not be empty")]
    EmptyInput { field: &'static str },

    /// The passphrase does not match the stored master fingerprint.
    #[error("invalid passphrase")]
    InvalidPassphrase,

    /// Too many consecutive failed authentications.
    #[error("too many failed attempts -- try again in {}s", .retry_after.as_secs().max(1))]
    LockedOut { retry_after: Duration },

    /// An operation that needs the session key ran without an active session.
    #[error("vault is locked -- authenticate first")]
    Locked,

    /// No credential has the requested id.
    #[error("no credential with id {id}")]
    NotFound { id: CredentialId },

    /// A single credential failed authenticated decryption.
    #[error("credential {id} is unreadable: {reason}")]
    VaultCorrupted { id: CredentialId, reason: String },

    /// Vault metadata (salt, KDF parameters, record collection) cannot be parsed.
    #[error("vault state is corrupted: {0}")]
    StateCorrupted(String),

    /// The platform cryptographic primitives are missing or failing.
    #[error("cryptography unavailable: {0}")]
    CryptoUnavailable(String),

    /// The storage backend failed to read or write.
    #[error("persistence failure: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A fill could not be committed to one document context.
    #[error("fill failed in context {context}: {message}")]
    Document { context: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable, serializable error code for the host command surface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
pub enum ErrorCode {
    Config,
    EmptyInput,
    InvalidPassphrase,
    LockedOut,
    Locked,
    NotFound,
    VaultCorrupted,
    StateCorrupted,
    CryptoUnavailable,
    PersistenceFailure,
    DocumentFailure,
    Internal,
}

impl LatchkeyError {
    /// Returns the stable code reported to the host.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::Config,
            Self::EmptyInput { .. } => ErrorCode::EmptyInput,
            Self::InvalidPassphrase => ErrorCode::InvalidPassphrase,
            Self::LockedOut { .. } => ErrorCode::LockedOut,
            Self::Locked => ErrorCode::Locked,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::VaultCorrupted { .. } => ErrorCode::VaultCorrupted,
            Self::StateCorrupted(_) => ErrorCode::StateCorrupted,
            Self::CryptoUnavailable(_) => ErrorCode::CryptoUnavailable,
            Self::Persistence { .. } => ErrorCode::PersistenceFailure,
            Self::Document { .. } => ErrorCode::DocumentFailure,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether no further vault operation can succeed in this process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CryptoUnavailable(_))
    }

    /// Wraps any storage-layer error as [`LatchkeyError::Persistence`].
    pub fn persistence<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Persistence { source: err.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_out_message_rounds_up_to_one_second() {
        let err = LatchkeyError::LockedOut {
            retry_after: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "too many failed attempts -- try again in 1s");
    }

    #[test]
    fn persistence_helper_boxes_strings() {
        let err = LatchkeyError::persistence("write failed");
        assert_eq!(err.code(), ErrorCode::PersistenceFailure);
        assert!(err.to_string().contains("write failed"));
    }

    #[test]
    fn only_crypto_failures_are_fatal() {
        assert!(LatchkeyError::CryptoUnavailable("rng".into()).is_fatal());
        assert!(!LatchkeyError::InvalidPassphrase.is_fatal());
        assert!(!LatchkeyError::Locked.is_fatal());
    }

    #[test]
    fn not_found_names_the_id() {
        let err = LatchkeyError::NotFound { id: CredentialId(7) };
        assert_eq!(err.to_string(), "no credential with id 7");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn error_code_serializes_as_variant_name() {
        let json = serde_json::to_string(&ErrorCode::InvalidPassphrase).unwrap();
        assert_eq!(json, "\"InvalidPassphrase\"");
        assert_eq!(ErrorCode::Locked.to_string(), "Locked");
    }
}

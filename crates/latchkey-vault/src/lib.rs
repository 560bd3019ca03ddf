// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-passphrase gate and AES-256-GCM encrypted credential store.
//!
//! A single Argon2id derivation per authentication yields both the session
//! key and the verifier behind the stored master fingerprint. Each
//! credential secret is sealed under the session key with a fresh nonce and
//! associated data binding it to its record.

pub mod auth;
pub mod crypto;
pub mod kdf;
mod keys;
pub mod prompt;
pub mod record;
pub mod session;
pub mod store;
pub mod vault;

pub use auth::{AuthOutcome, AuthStatus};
pub use prompt::{get_vault_passphrase, get_vault_passphrase_with_confirm, read_secret};
pub use record::{mask_secret, CredentialListing, CredentialSummary, DecryptedCredential};
pub use session::Session;
pub use vault::Vault;

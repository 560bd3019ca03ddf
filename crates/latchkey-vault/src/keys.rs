// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Names of the persisted key-value entries. The schema is private to the vault.

use latchkey_core::CredentialId;

pub const MASTER_FINGERPRINT: &str = "masterFingerprint";
pub const KDF_SALT: &str = "kdfSalt";
pub const KDF_PARAMS: &str = "kdfParams";
pub const AUTH_FAILURES: &str = "authFailures";
/// Ordered id index of the credential collection.
pub const CREDENTIALS: &str = "credentials";
pub const CREDENTIAL_SEQ: &str = "credentialSeq";

/// Entry holding one sealed credential record.
pub fn credential(id: CredentialId) -> String {
    format!("credential/{id}")
}

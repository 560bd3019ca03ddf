// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted and decrypted credential shapes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use latchkey_core::{CredentialId, LatchkeyError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, NONCE_LEN};
use crate::session::SessionKey;

const AAD_CONTEXT: &[u8] = b"latchkey/credential/v1";
const AAD_SEPARATOR: u8 = 0x1f;

/// Associated data binding a ciphertext to the record that holds it.
fn associated_data(id: CredentialId, site: &str, username: &str) -> Vec<u8> {
    let id = id.to_string();
    let mut aad = Vec::with_capacity(AAD_CONTEXT.len() + id.len() + site.len() + username.len() + 3);
    aad.extend_from_slice(AAD_CONTEXT);
    for part in [id.as_bytes(), site.as_bytes(), username.as_bytes()] {
        aad.push(AAD_SEPARATOR);
        aad.extend_from_slice(part);
    }
    aad
}

/// An AES-256-GCM sealed secret: base64 nonce and base64 `ciphertext || tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    pub nonce: String,
    pub ciphertext: String,
}

/// One credential as persisted. The secret is only ever ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub id: CredentialId,
    pub site: String,
    pub username: String,
    pub secret: SealedSecret,
    pub created: DateTime<Utc>,
}

impl StoredCredential {
    /// Seal `plaintext` for a new record.
    pub(crate) fn seal(
        key: &SessionKey,
        id: CredentialId,
        site: String,
        username: String,
        plaintext: &[u8],
    ) -> Result<Self, LatchkeyError> {
        let aad = associated_data(id, &site, &username);
        let (ciphertext, nonce) = crypto::seal(key.bytes(), plaintext, &aad)?;
        Ok(Self {
            id,
            site,
            username,
            secret: SealedSecret {
                nonce: BASE64.encode(nonce),
                ciphertext: BASE64.encode(ciphertext),
            },
            created: Utc::now(),
        })
    }

    /// Authenticate and decrypt. Any mismatch is `VaultCorrupted`, never garbage.
    pub(crate) fn open(&self, key: &SessionKey) -> Result<DecryptedCredential, LatchkeyError> {
        let corrupted = |reason: &str| LatchkeyError::VaultCorrupted {
            id: self.id,
            reason: reason.to_string(),
        };

        let nonce: [u8; NONCE_LEN] = BASE64
            .decode(&self.secret.nonce)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| corrupted("malformed nonce"))?;
        let ciphertext = BASE64
            .decode(&self.secret.ciphertext)
            .map_err(|_| corrupted("malformed ciphertext"))?;

        let aad = associated_data(self.id, &self.site, &self.username);
        let plaintext = crypto::open(key.bytes(), &nonce, &ciphertext, &aad)?
            .map_err(|e| corrupted(&e.to_string()))?;
        let secret = std::str::from_utf8(&plaintext)
            .map_err(|_| corrupted("secret is not UTF-8"))?;

        Ok(DecryptedCredential {
            id: self.id,
            site: self.site.clone(),
            username: self.username.clone(),
            secret: SecretString::from(secret.to_string()),
            created: self.created,
        })
    }

    pub fn summary(&self) -> CredentialSummary {
        CredentialSummary {
            id: self.id,
            site: self.site.clone(),
            username: self.username.clone(),
            created: self.created,
        }
    }
}

/// A credential with its secret in the clear, for fill and copy.
#[derive(Debug)]
pub struct DecryptedCredential {
    pub id: CredentialId,
    pub site: String,
    pub username: String,
    pub secret: SecretString,
    pub created: DateTime<Utc>,
}

/// Record metadata; readable without a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialSummary {
    pub id: CredentialId,
    pub site: String,
    pub username: String,
    pub created: DateTime<Utc>,
}

/// Result of listing: readable records plus records that failed to open.
#[derive(Debug, Default)]
pub struct CredentialListing {
    /// Most recent first.
    pub entries: Vec<DecryptedCredential>,
    pub unreadable: Vec<LatchkeyError>,
}

/// Mask a secret for display: first and last four characters of longer
/// values, `****` for anything shorter than ten characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use zeroize::Zeroizing;

    fn key(byte: u8) -> SessionKey {
        SessionKey::new(Zeroizing::new([byte; 32]))
    }

    fn sealed() -> StoredCredential {
        StoredCredential::seal(
            &key(7),
            CredentialId(1),
            "example.com".into(),
            "alice".into(),
            b"p@ss1",
        )
        .unwrap()
    }

    #[test]
    fn open_returns_plaintext() {
        let record = sealed();
        let opened = record.open(&key(7)).unwrap();
        assert_eq!(opened.secret.expose_secret(), "p@ss1");
        assert_eq!(opened.username, "alice");
    }

    #[test]
    fn wrong_key_is_vault_corrupted() {
        let err = sealed().open(&key(8)).unwrap_err();
        assert!(matches!(err, LatchkeyError::VaultCorrupted { id: CredentialId(1), .. }));
    }

    #[test]
    fn editing_metadata_breaks_authentication() {
        let mut record = sealed();
        record.username = "mallory".into();
        assert!(record.open(&key(7)).is_err());

        let mut record = sealed();
        record.id = CredentialId(2);
        assert!(record.open(&key(7)).is_err());
    }

    #[test]
    fn aad_separates_fields() {
        assert_ne!(
            associated_data(CredentialId(1), "ab", "c"),
            associated_data(CredentialId(1), "a", "bc")
        );
    }

    #[test]
    fn malformed_nonce_is_vault_corrupted() {
        let mut record = sealed();
        record.secret.nonce = BASE64.encode([0u8; 5]);
        assert!(matches!(
            record.open(&key(7)).unwrap_err(),
            LatchkeyError::VaultCorrupted { .. }
        ));
    }

    #[test]
    fn serialized_record_contains_no_plaintext() {
        let json = serde_json::to_string(&sealed()).unwrap();
        assert!(!json.contains("p@ss1"));
        assert!(json.contains("\"nonce\""));
    }

    #[test]
    fn mask_secret_variants() {
        assert_eq!(mask_secret("sk-ant-REDACTED"), "sk-a...mnop");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret(""), "****");
        assert_eq!(mask_secret("0123456789"), "0123...6789");
        assert_eq!(mask_secret("äöüßäöüßäöüß"), "äöüß...äöüß");
    }

    proptest::proptest! {
        #[test]
        fn mask_reveals_at_most_head_and_tail(value in "\\PC{0,40}") {
            let masked = mask_secret(&value);
            proptest::prop_assert!(masked.chars().count() <= 11);
            if value.chars().count() >= 10 {
                proptest::prop_assert!(value.starts_with(masked.split("...").next().unwrap_or_default()));
            } else {
                proptest::prop_assert_eq!(masked, "****");
            }
        }
    }
}

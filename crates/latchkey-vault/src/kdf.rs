// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.
//!
//! One derivation yields 64 bytes: the first half becomes the session key,
//! the second half the verifier the master fingerprint is computed from.

use latchkey_config::model::VaultConfig;
use latchkey_core::LatchkeyError;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Length of the random per-installation salt.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters, persisted alongside the salt at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&VaultConfig> for KdfParams {
    fn from(config: &VaultConfig) -> Self {
        Self {
            memory_cost: config.kdf_memory_cost,
            iterations: config.kdf_iterations,
            parallelism: config.kdf_parallelism,
        }
    }
}

impl KdfParams {
    fn argon2_params(self) -> Result<argon2::Params, argon2::Error> {
        argon2::Params::new(self.memory_cost, self.iterations, self.parallelism, Some(64))
    }

    /// Reject costs Argon2id cannot run with, such as fewer than 8 KiB of
    /// memory per lane. Registration calls this before anything is persisted.
    pub fn check(self) -> Result<(), LatchkeyError> {
        self.argon2_params().map(|_| ()).map_err(|e| {
            LatchkeyError::Config(format!(
                "vault KDF parameters rejected by Argon2id ({} KiB, {} lanes): {e}",
                self.memory_cost, self.parallelism
            ))
        })
    }
}

/// Output of one derivation, zeroed on drop.
pub struct KeyMaterial(Zeroizing<[u8; 64]>);

impl KeyMaterial {
    /// Bytes 0..32: the AES-256-GCM session key.
    pub fn session_key(&self) -> Zeroizing<[u8; 32]> {
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&self.0[..32]);
        key
    }

    /// Bytes 32..64: input to the master fingerprint.
    pub fn verifier(&self) -> &[u8] {
        &self.0[32..]
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Derive 64 bytes of key material from a passphrase using Argon2id.
pub fn derive_key_material(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: KdfParams,
) -> Result<KeyMaterial, LatchkeyError> {
    let argon_params = params
        .argon2_params()
        .map_err(|e| LatchkeyError::StateCorrupted(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; 64]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| LatchkeyError::CryptoUnavailable(format!("Argon2id derivation failed: {e}")))?;

    Ok(KeyMaterial(output))
}

/// Run [`derive_key_material`] on the blocking pool so the event loop keeps moving.
pub async fn derive_key_material_blocking(
    passphrase: Zeroizing<Vec<u8>>,
    salt: [u8; SALT_LEN],
    params: KdfParams,
) -> Result<KeyMaterial, LatchkeyError> {
    tokio::task::spawn_blocking(move || derive_key_material(&passphrase, &salt, params))
        .await
        .map_err(|e| LatchkeyError::Internal(format!("key derivation task failed: {e}")))?
}

/// Generate a random 16-byte salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], LatchkeyError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| LatchkeyError::CryptoUnavailable("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost for fast tests.
    const TEST_PARAMS: KdfParams = KdfParams {
        memory_cost: 8192,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn derive_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let a = derive_key_material(b"test passphrase", &salt, TEST_PARAMS).unwrap();
        let b = derive_key_material(b"test passphrase", &salt, TEST_PARAMS).unwrap();
        assert_eq!(a.session_key(), b.session_key());
        assert_eq!(a.verifier(), b.verifier());
    }

    #[test]
    fn different_passphrase_or_salt_changes_output() {
        let base = derive_key_material(b"one", &[1u8; SALT_LEN], TEST_PARAMS).unwrap();
        let other_pass = derive_key_material(b"two", &[1u8; SALT_LEN], TEST_PARAMS).unwrap();
        let other_salt = derive_key_material(b"one", &[2u8; SALT_LEN], TEST_PARAMS).unwrap();
        assert_ne!(base.session_key(), other_pass.session_key());
        assert_ne!(base.session_key(), other_salt.session_key());
    }

    #[test]
    fn halves_are_independent() {
        let material = derive_key_material(b"pass", &[3u8; SALT_LEN], TEST_PARAMS).unwrap();
        assert_ne!(&material.session_key()[..], material.verifier());
        assert_eq!(material.verifier().len(), 32);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = KdfParams {
            memory_cost: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(derive_key_material(b"pass", &[0u8; SALT_LEN], params).is_err());
    }

    #[test]
    fn debug_output_is_redacted() {
        let material = derive_key_material(b"pass", &[0u8; SALT_LEN], TEST_PARAMS).unwrap();
        assert_eq!(format!("{material:?}"), "KeyMaterial([REDACTED])");
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }

    #[tokio::test]
    async fn blocking_derivation_matches_inline() {
        let salt = [9u8; SALT_LEN];
        let inline = derive_key_material(b"pass", &salt, TEST_PARAMS).unwrap();
        let pooled =
            derive_key_material_blocking(Zeroizing::new(b"pass".to_vec()), salt, TEST_PARAMS)
                .await
                .unwrap();
        assert_eq!(inline.session_key(), pooled.session_key());
    }

    #[test]
    fn check_rejects_too_little_memory_per_lane() {
        let params = KdfParams {
            memory_cost: 64,
            iterations: 2,
            parallelism: 16,
        };
        assert!(matches!(params.check(), Err(LatchkeyError::Config(_))));
        assert!(TEST_PARAMS.check().is_ok());
    }
}

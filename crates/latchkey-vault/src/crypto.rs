// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse under one key would void GCM confidentiality.

use latchkey_core::LatchkeyError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Nonce length for AES-256-GCM.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Why [`open`] refused to return plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication failed -- wrong key or tampered data")]
pub struct OpenError;

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, LatchkeyError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| LatchkeyError::CryptoUnavailable("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM under a random 96-bit nonce.
///
/// `aad` is authenticated but not encrypted; the same bytes must be supplied
/// to [`open`]. Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(
    key: &[u8; 32],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), LatchkeyError> {
    let key = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| LatchkeyError::CryptoUnavailable("failed to generate random nonce".to_string()))?;

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::from(aad),
        &mut in_out,
    )
    .map_err(|_| LatchkeyError::CryptoUnavailable("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate a ciphertext produced by [`seal`].
///
/// The outer error is a primitive failure; the inner one means the data
/// did not authenticate and no plaintext is released.
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Result<Zeroizing<Vec<u8>>, OpenError>, LatchkeyError> {
    let key = aead_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    match key.open_in_place(
        Nonce::assume_unique_for_key(*nonce_bytes),
        Aad::from(aad),
        in_out.as_mut_slice(),
    ) {
        Ok(plaintext) => Ok(Ok(Zeroizing::new(plaintext.to_vec()))),
        Err(_) => Ok(Err(OpenError)),
    }
}

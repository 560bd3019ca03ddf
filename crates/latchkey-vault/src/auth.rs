// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The authentication gate: first-run registration, passphrase
//! verification against the stored master fingerprint, and failure backoff.
//!
//! The master fingerprint is `HMAC-SHA256(verifier, context)` where the
//! verifier is the second half of the Argon2id output. Testing a guess
//! against the stored fingerprint therefore costs a full derivation, and
//! the fingerprint says nothing about the session-key half.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use latchkey_config::model::VaultConfig;
use latchkey_core::{LatchkeyError, StorageAdapter};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::kdf::{self, KdfParams, KeyMaterial, SALT_LEN};
use crate::keys;
use crate::session::{Session, SessionKey};

type HmacSha256 = Hmac<Sha256>;

const FINGERPRINT_CONTEXT: &[u8] = b"latchkey master fingerprint v1";

/// Upper bound on a single lockout.
const MAX_LOCKOUT_SECS: u64 = 3600;

/// How a successful authentication came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No fingerprint existed; this passphrase is now the master passphrase.
    Registered,
    /// The passphrase matched the stored fingerprint.
    Verified,
}

/// Persisted backoff state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailures {
    pub count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl AuthFailures {
    /// Remaining lockout at `now`, if any.
    pub fn retry_after(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.locked_until
            .filter(|until| *until > now)
            .map(|until| (until - now).to_std().unwrap_or_default())
    }

    fn record_failure(&mut self, config: &VaultConfig, now: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        if config.max_failed_attempts == 0 || self.count < config.max_failed_attempts {
            return;
        }
        let doublings = (self.count - config.max_failed_attempts).min(16);
        let secs = config
            .lockout_secs
            .saturating_mul(1u64 << doublings)
            .min(MAX_LOCKOUT_SECS);
        self.locked_until = Some(now + chrono::Duration::seconds(secs as i64));
    }
}

/// Snapshot of the gate for status displays. Contains no secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub registered: bool,
    pub failed_attempts: u32,
    pub retry_after: Option<Duration>,
}

/// Registration and verification of the master passphrase.
pub struct AuthGate {
    storage: Arc<dyn StorageAdapter>,
    config: VaultConfig,
}

impl AuthGate {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: VaultConfig) -> Self {
        Self { storage, config }
    }

    /// Whether a master fingerprint has been registered.
    pub async fn is_registered(&self) -> Result<bool, LatchkeyError> {
        Ok(self.storage.get(keys::MASTER_FINGERPRINT).await?.is_some())
    }

    /// Current registration and backoff state.
    pub async fn status(&self) -> Result<AuthStatus, LatchkeyError> {
        let failures = self.load_failures().await?;
        Ok(AuthStatus {
            registered: self.is_registered().await?,
            failed_attempts: failures.count,
            retry_after: failures.retry_after(Utc::now()),
        })
    }

    /// Register the passphrase on first run, otherwise verify it.
    ///
    /// On success the returned [`Session`] owns the derived session key.
    pub async fn register_or_verify(
        &self,
        passphrase: &SecretString,
    ) -> Result<(Session, AuthOutcome), LatchkeyError> {
        if passphrase.expose_secret().is_empty() {
            return Err(LatchkeyError::EmptyInput { field: "passphrase" });
        }

        match self.storage.get(keys::MASTER_FINGERPRINT).await? {
            None => self.register(passphrase).await,
            Some(stored) => self.verify(passphrase, &stored).await,
        }
    }

    async fn register(
        &self,
        passphrase: &SecretString,
    ) -> Result<(Session, AuthOutcome), LatchkeyError> {
        let params = KdfParams::from(&self.config);
        params.check()?;
        let salt = kdf::generate_salt()?;
        let material = derive(passphrase, salt, params).await?;
        let fingerprint = fingerprint(&material)?;

        let params_json = serde_json::to_string(&params)
            .map_err(|e| LatchkeyError::Internal(format!("failed to encode KDF params: {e}")))?;
        self.storage
            .put_all(vec![
                (keys::MASTER_FINGERPRINT.to_string(), fingerprint),
                (keys::KDF_SALT.to_string(), BASE64.encode(salt)),
                (keys::KDF_PARAMS.to_string(), params_json),
                (
                    keys::AUTH_FAILURES.to_string(),
                    encode_failures(&AuthFailures::default())?,
                ),
            ])
            .await?;

        info!(
            memory_cost = params.memory_cost,
            iterations = params.iterations,
            "vault created"
        );
        Ok((session_from(&material), AuthOutcome::Registered))
    }

    async fn verify(
        &self,
        passphrase: &SecretString,
        stored_fingerprint: &str,
    ) -> Result<(Session, AuthOutcome), LatchkeyError> {
        let mut failures = self.load_failures().await?;
        let now = Utc::now();
        if let Some(retry_after) = failures.retry_after(now) {
            warn!(failed_attempts = failures.count, "authentication refused during lockout");
            return Err(LatchkeyError::LockedOut { retry_after });
        }

        let salt = self.load_salt().await?;
        let params = self.load_params().await?;
        let material = derive(passphrase, salt, params).await?;

        if !fingerprint_matches(&material, stored_fingerprint)? {
            failures.record_failure(&self.config, now);
            self.storage
                .put_all(vec![(keys::AUTH_FAILURES.to_string(), encode_failures(&failures)?)])
                .await?;
            warn!(failed_attempts = failures.count, "authentication failed");
            return Err(LatchkeyError::InvalidPassphrase);
        }

        if failures != AuthFailures::default() {
            self.storage
                .put_all(vec![(
                    keys::AUTH_FAILURES.to_string(),
                    encode_failures(&AuthFailures::default())?,
                )])
                .await?;
            debug!("failure counter reset");
        }

        info!("vault unlocked");
        Ok((session_from(&material), AuthOutcome::Verified))
    }

    async fn load_failures(&self) -> Result<AuthFailures, LatchkeyError> {
        match self.storage.get(keys::AUTH_FAILURES).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| LatchkeyError::StateCorrupted(format!("auth failure record: {e}"))),
            None => Ok(AuthFailures::default()),
        }
    }

    async fn load_salt(&self) -> Result<[u8; SALT_LEN], LatchkeyError> {
        let raw = self
            .storage
            .get(keys::KDF_SALT)
            .await?
            .ok_or_else(|| LatchkeyError::StateCorrupted("KDF salt is missing".to_string()))?;
        BASE64
            .decode(raw.trim())
            .ok()
            .and_then(|bytes| <[u8; SALT_LEN]>::try_from(bytes).ok())
            .ok_or_else(|| {
                LatchkeyError::StateCorrupted(format!("KDF salt is not {SALT_LEN} base64 bytes"))
            })
    }

    async fn load_params(&self) -> Result<KdfParams, LatchkeyError> {
        let raw = self
            .storage
            .get(keys::KDF_PARAMS)
            .await?
            .ok_or_else(|| LatchkeyError::StateCorrupted("KDF parameters are missing".to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| LatchkeyError::StateCorrupted(format!("KDF parameters: {e}")))
    }
}

async fn derive(
    passphrase: &SecretString,
    salt: [u8; SALT_LEN],
    params: KdfParams,
) -> Result<KeyMaterial, LatchkeyError> {
    let bytes = Zeroizing::new(passphrase.expose_secret().as_bytes().to_vec());
    kdf::derive_key_material_blocking(bytes, salt, params).await
}

fn session_from(material: &KeyMaterial) -> Session {
    Session::new(SessionKey::new(material.session_key()))
}

fn fingerprint_mac(material: &KeyMaterial) -> Result<HmacSha256, LatchkeyError> {
    let mut mac = HmacSha256::new_from_slice(material.verifier())
        .map_err(|e| LatchkeyError::CryptoUnavailable(format!("HMAC-SHA256 unavailable: {e}")))?;
    mac.update(FINGERPRINT_CONTEXT);
    Ok(mac)
}

/// Hex-encoded master fingerprint for the given key material.
pub fn fingerprint(material: &KeyMaterial) -> Result<String, LatchkeyError> {
    Ok(hex::encode(fingerprint_mac(material)?.finalize().into_bytes()))
}

/// Constant-time comparison against a stored fingerprint.
fn fingerprint_matches(material: &KeyMaterial, stored: &str) -> Result<bool, LatchkeyError> {
    let stored = hex::decode(stored.trim())
        .map_err(|_| LatchkeyError::StateCorrupted("master fingerprint is not hex".to_string()))?;
    Ok(fingerprint_mac(material)?.verify_slice(&stored).is_ok())
}

fn encode_failures(failures: &AuthFailures) -> Result<String, LatchkeyError> {
    serde_json::to_string(failures)
        .map_err(|e| LatchkeyError::Internal(format!("failed to encode auth failures: {e}")))
}

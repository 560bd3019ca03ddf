// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The authenticated session and the key it exclusively owns.

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

/// Symmetric key for the credential store. Lives only in memory.
///
/// Neither `Clone` nor serializable; the bytes are zeroed on drop and
/// Debug output omits them.
pub struct SessionKey(Zeroizing<[u8; 32]>);

impl SessionKey {
    pub(crate) fn new(bytes: Zeroizing<[u8; 32]>) -> Self {
        Self(bytes)
    }

    pub(crate) fn bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

/// One authenticated session: created by a successful authentication,
/// destroyed by [`crate::Vault::lock`] or by being dropped.
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(key: SessionKey) -> Self {
        Self {
            key,
            opened_at: Utc::now(),
        }
    }

    pub(crate) fn key(&self) -> &SessionKey {
        &self.key
    }

    /// When authentication succeeded.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

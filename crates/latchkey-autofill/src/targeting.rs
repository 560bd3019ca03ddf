// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure field selection over the descriptors of one document context.

use latchkey_core::{FieldDescriptor, FieldHandle, FieldSelector};
use tracing::debug;

use crate::classify::{identity_tier, is_secret_candidate, IdentityTier};
use crate::overrides::OverrideSet;

/// Where the identity field choice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Override,
    Tier(IdentityTier),
}

/// Zero-or-one identity field and zero-or-one secret field within one context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMatch {
    pub identity: Option<FieldHandle>,
    pub identity_source: Option<IdentitySource>,
    pub secret: Option<FieldHandle>,
}

impl FieldMatch {
    pub fn is_empty(&self) -> bool {
        self.identity.is_none() && self.secret.is_none()
    }
}

fn by_selector(fields: &[FieldDescriptor], selector: &FieldSelector) -> Option<FieldHandle> {
    fields
        .iter()
        .find(|f| selector.matches(f) && f.is_interactive())
        .map(|f| f.handle)
}

/// First field of the strongest tier present, in document order.
fn heuristic_identity(fields: &[FieldDescriptor]) -> Option<(FieldHandle, IdentityTier)> {
    let mut best: Option<(FieldHandle, IdentityTier)> = None;
    for field in fields {
        if let Some(tier) = identity_tier(field)
            && best.is_none_or(|(_, current)| tier < current)
        {
            best = Some((field.handle, tier));
        }
    }
    best
}

fn heuristic_secret(fields: &[FieldDescriptor]) -> Option<FieldHandle> {
    fields.iter().find(|f| is_secret_candidate(f)).map(|f| f.handle)
}

/// Choose the identity and secret fields for `hostname`.
///
/// A site override's selector decides its half outright, even when its
/// element is missing; halves without a selector use the heuristics.
pub fn select_fields(hostname: &str, fields: &[FieldDescriptor], overrides: &OverrideSet) -> FieldMatch {
    let site = overrides.lookup(hostname);

    let (identity, identity_source) = match site.and_then(|o| o.identity.as_ref()) {
        Some(selector) => {
            let handle = by_selector(fields, selector);
            if handle.is_none() {
                debug!(hostname, %selector, "override identity field not present");
            }
            (handle, handle.map(|_| IdentitySource::Override))
        }
        None => match heuristic_identity(fields) {
            Some((handle, tier)) => (Some(handle), Some(IdentitySource::Tier(tier))),
            None => (None, None),
        },
    };

    let secret = match site.and_then(|o| o.secret.as_ref()) {
        Some(selector) => {
            let handle = by_selector(fields, selector);
            if handle.is_none() {
                debug!(hostname, %selector, "override secret field not present");
            }
            handle
        }
        None => heuristic_secret(fields),
    };

    // One element never receives both values; the secret keeps it.
    let (identity, identity_source) = if identity.is_some() && identity == secret {
        debug!(hostname, "identity and secret resolved to the same field");
        (None, None)
    } else {
        (identity, identity_source)
    };

    FieldMatch {
        identity,
        identity_source,
        secret,
    }
}

// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic classification of input fields.
//!
//! Identity candidates fall into four tiers, strongest first. Only visible,
//! enabled fields are ever classified.

use latchkey_core::FieldDescriptor;

/// How strongly a field looks like the identity (username/email) input.
///
/// Variants are ordered strongest first, so `min()` over candidates picks
/// the best tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentityTier {
    /// `type="email"`.
    EmailType,
    /// `name` or `placeholder` mentions "email".
    EmailHint,
    /// `name` or `placeholder` mentions "user".
    UserHint,
    /// Any plain text input.
    Text,
}

impl std::fmt::Display for IdentityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityTier::EmailType => write!(f, "email-type"),
            IdentityTier::EmailHint => write!(f, "email-hint"),
            IdentityTier::UserHint => write!(f, "user-hint"),
            IdentityTier::Text => write!(f, "text"),
        }
    }
}

/// Input types that can never receive the identity value.
const NON_IDENTITY_TYPES: &[&str] = &[
    "password", "hidden", "checkbox", "radio", "submit", "button", "file", "image", "reset",
];

fn hint_contains(field: &FieldDescriptor, needle: &str) -> bool {
    [field.name.as_deref(), field.placeholder.as_deref()]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(needle))
}

/// The identity tier of a field, or `None` if it is not a candidate.
pub fn identity_tier(field: &FieldDescriptor) -> Option<IdentityTier> {
    if !field.is_interactive() {
        return None;
    }
    let input_type = field.effective_type();
    if NON_IDENTITY_TYPES.contains(&input_type.as_str()) {
        return None;
    }

    if input_type == "email" {
        Some(IdentityTier::EmailType)
    } else if hint_contains(field, "email") {
        Some(IdentityTier::EmailHint)
    } else if hint_contains(field, "user") {
        Some(IdentityTier::UserHint)
    } else if input_type == "text" {
        Some(IdentityTier::Text)
    } else {
        None
    }
}

/// Whether a field can receive the secret value.
pub fn is_secret_candidate(field: &FieldDescriptor) -> bool {
    field.is_interactive() && field.effective_type() == "password"
}

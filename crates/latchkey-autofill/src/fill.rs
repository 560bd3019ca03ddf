// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Committing values into a document context.
//!
//! Each value goes in through the native setter and is followed by bubbling
//! `input` and `change` events, so frameworks that track their own state
//! observe the change. Identity is always committed before secret.

use latchkey_core::{DocumentContext, DomEvent, FieldHandle, LatchkeyError};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::overrides::OverrideSet;
use crate::targeting::select_fields;

/// Which halves were filled in one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillOutcome {
    pub identity_filled: bool,
    pub secret_filled: bool,
}

/// Runs field selection and commits values. Holds no vault access; the
/// caller hands it the two plaintext values.
#[derive(Debug, Clone, Default)]
pub struct FillEngine {
    overrides: OverrideSet,
}

impl FillEngine {
    pub fn new(overrides: OverrideSet) -> Self {
        Self { overrides }
    }

    /// Fill one context. A missing field is skipped, never an error.
    pub async fn fill(
        &self,
        ctx: &dyn DocumentContext,
        username: &str,
        secret: &SecretString,
    ) -> Result<FillOutcome, LatchkeyError> {
        let fields = ctx.fields().await?;
        let matched = select_fields(ctx.hostname(), &fields, &self.overrides);
        debug!(
            context = ctx.context_id(),
            hostname = ctx.hostname(),
            fields = fields.len(),
            identity = ?matched.identity,
            identity_source = ?matched.identity_source,
            secret = ?matched.secret,
            "fields selected"
        );

        let mut outcome = FillOutcome::default();
        if let Some(handle) = matched.identity {
            commit(ctx, handle, username).await?;
            outcome.identity_filled = true;
        } else {
            debug!(context = ctx.context_id(), "no identity field");
        }
        if let Some(handle) = matched.secret {
            commit(ctx, handle, secret.expose_secret()).await?;
            outcome.secret_filled = true;
        } else {
            debug!(context = ctx.context_id(), "no secret field");
        }
        Ok(outcome)
    }
}

async fn commit(ctx: &dyn DocumentContext, handle: FieldHandle, value: &str) -> Result<(), LatchkeyError> {
    ctx.focus(handle).await?;
    ctx.set_value_native(handle, value).await?;
    ctx.dispatch_event(handle, DomEvent::Input, true).await?;
    ctx.dispatch_event(handle, DomEvent::Change, true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_test_utils::fixtures::*;
    use latchkey_test_utils::{MockDocument, RecordedAction};

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn email_and_password_filled_in_order() {
        let doc = MockDocument::new("top", "example.com", email_login_form());
        let outcome = FillEngine::default()
            .fill(&doc, "alice@example.com", &secret("p@ss1"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            FillOutcome {
                identity_filled: true,
                secret_filled: true
            }
        );

        let (id, pw) = (FieldHandle(1), FieldHandle(2));
        assert_eq!(
            doc.actions(),
            vec![
                RecordedAction::Focus(id),
                RecordedAction::SetValue(id, "alice@example.com".into()),
                RecordedAction::Event(id, DomEvent::Input, true),
                RecordedAction::Event(id, DomEvent::Change, true),
                RecordedAction::Focus(pw),
                RecordedAction::SetValue(pw, "p@ss1".into()),
                RecordedAction::Event(pw, DomEvent::Input, true),
                RecordedAction::Event(pw, DomEvent::Change, true),
            ]
        );
        assert_eq!(doc.value(FieldHandle(0)), None, "search box untouched");
    }

    #[tokio::test]
    async fn no_password_field_fills_identity_only() {
        let doc = MockDocument::new("top", "example.com", newsletter_form());
        let outcome = FillEngine::default()
            .fill(&doc, "alice", &secret("p@ss1"))
            .await
            .unwrap();
        assert!(outcome.identity_filled);
        assert!(!outcome.secret_filled);
        assert_eq!(doc.value(FieldHandle(0)).as_deref(), Some("alice"));
        assert!(!doc
            .actions()
            .iter()
            .any(|a| matches!(a, RecordedAction::SetValue(_, v) if v == "p@ss1")));
    }

    #[tokio::test]
    async fn empty_document_is_not_an_error() {
        let doc = MockDocument::new("top", "example.com", vec![]);
        let outcome = FillEngine::default().fill(&doc, "a", &secret("b")).await.unwrap();
        assert_eq!(outcome, FillOutcome::default());
        assert!(doc.actions().is_empty());
    }

    #[tokio::test]
    async fn setter_failure_propagates() {
        let doc = MockDocument::new("top", "example.com", username_login_form())
            .failing_set_on(FieldHandle(1));
        let err = FillEngine::default()
            .fill(&doc, "alice", &secret("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, LatchkeyError::Document { .. }));
        assert_eq!(doc.value(FieldHandle(0)).as_deref(), Some("alice"));
    }
}

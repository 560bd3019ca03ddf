// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability a target document exposes to the autofill engine.

use async_trait::async_trait;

use crate::error::LatchkeyError;
use crate::types::{DomEvent, FieldDescriptor, FieldHandle};

/// One document context (a top-level page or a nested frame).
///
/// Implementations execute in the target page's own context. They never
/// see the vault; the engine hands them plaintext values one call at a time.
#[async_trait]
pub trait DocumentContext: Send + Sync {
    /// Stable identifier for diagnostics (e.g. a frame id).
    fn context_id(&self) -> &str;

    /// Hostname the document was loaded from.
    fn hostname(&self) -> &str;

    /// All input-like elements currently in the document, in document order.
    async fn fields(&self) -> Result<Vec<FieldDescriptor>, LatchkeyError>;

    /// Moves focus to the element.
    async fn focus(&self, field: FieldHandle) -> Result<(), LatchkeyError>;

    /// Writes the value through the platform's native property setter,
    /// bypassing any framework wrapper installed on the element instance.
    async fn set_value_native(&self, field: FieldHandle, value: &str) -> Result<(), LatchkeyError>;

    /// Dispatches a synthetic event on the element.
    async fn dispatch_event(
        &self,
        field: FieldHandle,
        event: DomEvent,
        bubbles: bool,
    ) -> Result<(), LatchkeyError>;
}

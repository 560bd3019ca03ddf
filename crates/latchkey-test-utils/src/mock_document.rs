// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock document context for deterministic fill tests.
//!
//! `MockDocument` serves a fixed list of fields and records every action the
//! fill engine performs, in order, so tests can assert on the exact sequence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use latchkey_core::{DocumentContext, DomEvent, FieldDescriptor, FieldHandle, LatchkeyError};

/// One action observed by a [`MockDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Focus(FieldHandle),
    SetValue(FieldHandle, String),
    Event(FieldHandle, DomEvent, bool),
}

#[derive(Debug, Default)]
struct State {
    actions: Vec<RecordedAction>,
    values: HashMap<FieldHandle, String>,
}

/// A scriptable [`DocumentContext`].
#[derive(Debug)]
pub struct MockDocument {
    id: String,
    hostname: String,
    fields: Vec<FieldDescriptor>,
    fail_fields: bool,
    fail_set_on: Option<FieldHandle>,
    state: Mutex<State>,
}

impl MockDocument {
    pub fn new(id: &str, hostname: &str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            id: id.to_string(),
            hostname: hostname.to_string(),
            fields,
            fail_fields: false,
            fail_set_on: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Make `fields()` fail, as a detached frame would.
    pub fn failing_enumeration(mut self) -> Self {
        self.fail_fields = true;
        self
    }

    /// Make `set_value_native` fail for one handle.
    pub fn failing_set_on(mut self, handle: FieldHandle) -> Self {
        self.fail_set_on = Some(handle);
        self
    }

    /// Every action performed so far.
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.lock().actions.clone()
    }

    /// Value last written to `handle`.
    pub fn value(&self, handle: FieldHandle) -> Option<String> {
        self.lock().values.get(&handle).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn failure(&self, message: &str) -> LatchkeyError {
        LatchkeyError::Document {
            context: self.id.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl DocumentContext for MockDocument {
    fn context_id(&self) -> &str {
        &self.id
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn fields(&self) -> Result<Vec<FieldDescriptor>, LatchkeyError> {
        if self.fail_fields {
            return Err(self.failure("frame detached"));
        }
        Ok(self.fields.clone())
    }

    async fn focus(&self, handle: FieldHandle) -> Result<(), LatchkeyError> {
        self.lock().actions.push(RecordedAction::Focus(handle));
        Ok(())
    }

    async fn set_value_native(&self, handle: FieldHandle, value: &str) -> Result<(), LatchkeyError> {
        if self.fail_set_on == Some(handle) {
            return Err(self.failure("native value setter unavailable"));
        }
        let mut state = self.lock();
        state
            .actions
            .push(RecordedAction::SetValue(handle, value.to_string()));
        state.values.insert(handle, value.to_string());
        Ok(())
    }

    async fn dispatch_event(
        &self,
        handle: FieldHandle,
        event: DomEvent,
        bubbles: bool,
    ) -> Result<(), LatchkeyError> {
        self.lock()
            .actions
            .push(RecordedAction::Event(handle, event, bubbles));
        Ok(())
    }
}

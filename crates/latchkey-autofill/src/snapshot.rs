// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON page snapshots and an in-memory [`DocumentContext`] over them.
//!
//! A snapshot lists the frames of a page with their input fields:
//!
//! ```json
//! {"frames": [{"id": "top", "hostname": "example.com",
//!              "fields": [{"type": "email", "name": "email"},
//!                         {"type": "password", "name": "password"}]}]}
//! ```
//!
//! Field handles are positional within their frame. After a fill the
//! snapshot carries each field's value and a per-frame journal of actions.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use latchkey_core::{DocumentContext, DomEvent, FieldDescriptor, FieldHandle, LatchkeyError};
use serde::{Deserialize, Serialize};

/// One field of a frame, with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotField {
    #[serde(flatten)]
    pub descriptor: FieldDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One action performed on a snapshot document. Values are not journaled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum JournalEntry {
    Focus { field: FieldHandle },
    Set { field: FieldHandle },
    Input { field: FieldHandle, bubbles: bool },
    Change { field: FieldHandle, bubbles: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub fields: Vec<SnapshotField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub journal: Vec<JournalEntry>,
}

impl FrameSnapshot {
    fn assign_handles(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.descriptor.handle = FieldHandle(index);
        }
    }
}

/// A page: the top-level frame first, then nested frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub frames: Vec<FrameSnapshot>,
}

impl PageSnapshot {
    pub fn from_json(json: &str) -> Result<Self, LatchkeyError> {
        let mut page: PageSnapshot = serde_json::from_str(json)
            .map_err(|e| LatchkeyError::Config(format!("invalid page snapshot: {e}")))?;
        if page.frames.is_empty() {
            return Err(LatchkeyError::Config("page snapshot has no frames".to_string()));
        }
        for frame in &mut page.frames {
            frame.assign_handles();
        }
        Ok(page)
    }

    pub fn load(path: &Path) -> Result<Self, LatchkeyError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            LatchkeyError::Config(format!("failed to read page snapshot {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, LatchkeyError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LatchkeyError::Internal(format!("failed to encode page snapshot: {e}")))
    }

    /// One document per frame, in frame order.
    pub fn into_documents(self) -> Vec<Arc<SnapshotDocument>> {
        self.frames
            .into_iter()
            .map(|frame| Arc::new(SnapshotDocument::new(frame)))
            .collect()
    }

    /// Reassemble a page from its documents' current state.
    pub fn from_documents(documents: &[Arc<SnapshotDocument>]) -> Self {
        Self {
            frames: documents.iter().map(|d| d.snapshot()).collect(),
        }
    }
}

/// In-memory document over one [`FrameSnapshot`].
#[derive(Debug)]
pub struct SnapshotDocument {
    id: String,
    hostname: String,
    frame: Mutex<FrameSnapshot>,
}

impl SnapshotDocument {
    pub fn new(mut frame: FrameSnapshot) -> Self {
        frame.assign_handles();
        Self {
            id: frame.id.clone(),
            hostname: frame.hostname.clone(),
            frame: Mutex::new(frame),
        }
    }

    /// Current state, including values and journal.
    pub fn snapshot(&self) -> FrameSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FrameSnapshot> {
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unknown(&self, handle: FieldHandle) -> LatchkeyError {
        LatchkeyError::Document {
            context: self.id.clone(),
            message: format!("no field with handle {}", handle.0),
        }
    }

    fn record(&self, handle: FieldHandle, entry: JournalEntry) -> Result<(), LatchkeyError> {
        let mut frame = self.lock();
        if handle.0 >= frame.fields.len() {
            return Err(self.unknown(handle));
        }
        frame.journal.push(entry);
        Ok(())
    }
}

#[async_trait]
impl DocumentContext for SnapshotDocument {
    fn context_id(&self) -> &str {
        &self.id
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn fields(&self) -> Result<Vec<FieldDescriptor>, LatchkeyError> {
        Ok(self.lock().fields.iter().map(|f| f.descriptor.clone()).collect())
    }

    async fn focus(&self, field: FieldHandle) -> Result<(), LatchkeyError> {
        self.record(field, JournalEntry::Focus { field })
    }

    async fn set_value_native(&self, field: FieldHandle, value: &str) -> Result<(), LatchkeyError> {
        let mut frame = self.lock();
        let Some(target) = frame.fields.get_mut(field.0) else {
            return Err(self.unknown(field));
        };
        target.value = Some(value.to_string());
        frame.journal.push(JournalEntry::Set { field });
        Ok(())
    }

    async fn dispatch_event(
        &self,
        field: FieldHandle,
        event: DomEvent,
        bubbles: bool,
    ) -> Result<(), LatchkeyError> {
        let entry = match event {
            DomEvent::Input => JournalEntry::Input { field, bubbles },
            DomEvent::Change => JournalEntry::Change { field, bubbles },
        };
        self.record(field, entry)
    }
}

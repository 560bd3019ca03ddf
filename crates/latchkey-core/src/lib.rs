// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Latchkey vault.
//!
//! This crate provides the error taxonomy, shared identifier and field
//! types, and the adapter traits at the two seams of the system: the
//! key-value persistence backend and the target document a credential is
//! filled into.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorCode, LatchkeyError};
pub use types::{CredentialId, DomEvent, FieldDescriptor, FieldHandle, FieldSelector};

pub use traits::{DocumentContext, StorageAdapter};

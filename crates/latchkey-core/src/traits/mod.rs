// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Both seams use `#[async_trait]` for dynamic dispatch compatibility.

pub mod document;
pub mod storage;

pub use document::DocumentContext;
pub use storage::StorageAdapter;

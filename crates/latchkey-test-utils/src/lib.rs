// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Latchkey integration tests.
//!
//! # Components
//!
//! - [`MemoryStorage`] - In-memory key-value backend with inspection helpers
//! - [`FailingStorage`] - Backend whose writes can be made to fail on demand
//! - [`MockDocument`] - Scriptable document context that records fill actions
//! - [`TestEnv`] - Temp-directory config with cheap KDF parameters

pub mod fixtures;
pub mod harness;
pub mod mock_document;
pub mod mock_storage;

pub use harness::{test_vault_config, TestEnv, TestEnvBuilder};
pub use mock_document::{MockDocument, RecordedAction};
pub use mock_storage::{FailingStorage, MemoryStorage};

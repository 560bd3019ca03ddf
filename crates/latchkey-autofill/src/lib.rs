// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Autofill targeting engine.
//!
//! Given the fields of one document context, [`select_fields`] picks at most
//! one identity field and one secret field; [`FillEngine::fill`] commits the
//! two values the way a user typing would. [`FillDispatcher`] runs the
//! engine independently across every frame of a page.

pub mod classify;
pub mod dispatch;
pub mod fill;
pub mod overrides;
pub mod snapshot;
pub mod targeting;

pub use classify::IdentityTier;
pub use dispatch::{Dispatch, FillDispatcher, FillPayload, FillReport};
pub use fill::{FillEngine, FillOutcome};
pub use overrides::{OverrideSet, SiteOverride};
pub use snapshot::{FrameSnapshot, JournalEntry, PageSnapshot, SnapshotDocument, SnapshotField};
pub use targeting::{select_fields, FieldMatch, IdentitySource};

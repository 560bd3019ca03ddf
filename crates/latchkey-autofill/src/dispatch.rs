// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget fill across every frame of a page.
//!
//! Each eligible context gets its own spawned task. Tasks report on a shared
//! unbounded channel that the host may drain or drop; a failing context
//! never affects the others.

use std::sync::Arc;

use latchkey_config::model::AutofillConfig;
use latchkey_core::{DocumentContext, LatchkeyError};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::fill::{FillEngine, FillOutcome};

/// The two plaintext values handed to every context.
pub struct FillPayload {
    pub username: String,
    pub secret: SecretString,
}

impl std::fmt::Debug for FillPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillPayload")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of one context's fill task.
#[derive(Debug)]
pub struct FillReport {
    pub context_id: String,
    pub hostname: String,
    pub result: Result<FillOutcome, LatchkeyError>,
}

/// Handle returned by [`FillDispatcher::dispatch`].
#[derive(Debug)]
pub struct Dispatch {
    /// Contexts that were handed to a task.
    pub dispatched: usize,
    /// Ids of contexts skipped as cross-origin.
    pub skipped: Vec<String>,
    reports: mpsc::UnboundedReceiver<FillReport>,
}

impl Dispatch {
    /// Wait for every dispatched task and return their reports in
    /// completion order.
    pub async fn collect(mut self) -> Vec<FillReport> {
        let mut reports = Vec::with_capacity(self.dispatched);
        while let Some(report) = self.reports.recv().await {
            reports.push(report);
        }
        reports
    }
}

#[derive(Debug, Clone)]
pub struct FillDispatcher {
    engine: Arc<FillEngine>,
    same_origin_only: bool,
}

impl FillDispatcher {
    pub fn new(engine: FillEngine, same_origin_only: bool) -> Self {
        Self {
            engine: Arc::new(engine),
            same_origin_only,
        }
    }

    pub fn from_config(config: &AutofillConfig) -> Result<Self, LatchkeyError> {
        let overrides = crate::overrides::OverrideSet::from_config(config)?;
        Ok(Self::new(FillEngine::new(overrides), config.same_origin_only))
    }

    /// Spawn one fill task per eligible context. The first context is the
    /// top-level document; with same-origin filtering on, contexts with a
    /// different hostname are skipped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, contexts: Vec<Arc<dyn DocumentContext>>, payload: FillPayload) -> Dispatch {
        let (tx, rx) = mpsc::unbounded_channel();
        let payload = Arc::new(payload);
        let top_host = contexts.first().map(|c| c.hostname().to_ascii_lowercase());

        let mut dispatched = 0;
        let mut skipped = Vec::new();
        for ctx in contexts {
            if self.same_origin_only
                && let Some(top) = &top_host
                && !ctx.hostname().eq_ignore_ascii_case(top)
            {
                info!(
                    context = ctx.context_id(),
                    hostname = ctx.hostname(),
                    top = %top,
                    "skipping cross-origin context"
                );
                skipped.push(ctx.context_id().to_string());
                continue;
            }

            dispatched += 1;
            let engine = self.engine.clone();
            let payload = payload.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = engine
                    .fill(ctx.as_ref(), &payload.username, &payload.secret)
                    .await;
                match &result {
                    Ok(outcome) => debug!(context = ctx.context_id(), ?outcome, "context filled"),
                    Err(e) => warn!(context = ctx.context_id(), error = %e, "context fill failed"),
                }
                // The host may have dropped the receiver; that is fine.
                let _ = tx.send(FillReport {
                    context_id: ctx.context_id().to_string(),
                    hostname: ctx.hostname().to_string(),
                    result,
                });
            });
        }

        Dispatch {
            dispatched,
            skipped,
            reports: rx,
        }
    }
}

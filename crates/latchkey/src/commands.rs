// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command handlers shared by the one-shot CLI and the interactive shell.
//!
//! Handlers take already-acquired inputs (passphrase, secret, page) and
//! return report values; prompting and printing happen in the caller.

use std::path::Path;
use std::sync::Arc;

use latchkey_autofill::{FillDispatcher, FillPayload, PageSnapshot};
use latchkey_config::model::LatchkeyConfig;
use latchkey_core::{CredentialId, DocumentContext, LatchkeyError, StorageAdapter};
use latchkey_storage::SqliteStorage;
use latchkey_vault::{mask_secret, AuthOutcome, Vault};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::output::{
    AddReport, DeleteReport, ErrorReport, FillSummary, FrameResult, GetReport, InitReport,
    ListEntry, ListReport, StatusReport,
};

/// Open (creating if needed) the configured SQLite vault, locked.
pub async fn open_vault(config: &LatchkeyConfig) -> Result<Vault, LatchkeyError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Vault::new(Arc::new(storage), &config.vault))
}

/// Verify against an existing vault. Refuses to register implicitly.
pub async fn unlock(vault: &mut Vault, passphrase: &SecretString) -> Result<(), LatchkeyError> {
    if !vault.exists().await? {
        return Err(LatchkeyError::Config(
            "no vault found; run `latchkey init` first".to_string(),
        ));
    }
    vault.authenticate(passphrase).await?;
    Ok(())
}

pub async fn init(vault: &mut Vault, passphrase: &SecretString) -> Result<InitReport, LatchkeyError> {
    let outcome = vault.authenticate(passphrase).await?;
    Ok(InitReport {
        ok: true,
        created: outcome == AuthOutcome::Registered,
    })
}

pub async fn add(
    vault: &Vault,
    site: &str,
    username: &str,
    secret: &SecretString,
) -> Result<AddReport, LatchkeyError> {
    let id = vault.add(site, username, secret).await?;
    Ok(AddReport { id })
}

/// Decrypted listing plus the records that could not be opened.
pub async fn list(vault: &Vault, reveal: bool) -> Result<(ListReport, Vec<LatchkeyError>), LatchkeyError> {
    let listing = vault.list().await?;
    let entries = listing
        .entries
        .into_iter()
        .map(|e| ListEntry {
            id: e.id,
            secret: if reveal {
                e.secret.expose_secret().to_string()
            } else {
                mask_secret(e.secret.expose_secret())
            },
            site: e.site,
            username: e.username,
            created: e.created,
        })
        .collect();
    Ok((ListReport { entries }, listing.unreadable))
}

pub async fn get(vault: &Vault, id: CredentialId) -> Result<GetReport, LatchkeyError> {
    let credential = vault.get(id).await?.ok_or(LatchkeyError::NotFound { id })?;
    Ok(GetReport {
        id: credential.id,
        site: credential.site,
        username: credential.username,
        secret: credential.secret.expose_secret().to_string(),
    })
}

pub async fn delete(vault: &Vault, id: CredentialId) -> Result<DeleteReport, LatchkeyError> {
    let deleted = vault.delete(id).await?;
    Ok(DeleteReport { ok: true, deleted })
}

/// Fill every frame of `page` with credential `id` and return the summary
/// together with the filled page.
pub async fn fill(
    vault: &Vault,
    dispatcher: &FillDispatcher,
    id: CredentialId,
    page: PageSnapshot,
) -> Result<(FillSummary, PageSnapshot), LatchkeyError> {
    let credential = vault.get(id).await?.ok_or(LatchkeyError::NotFound { id })?;
    let documents = page.into_documents();
    let contexts: Vec<Arc<dyn DocumentContext>> = documents
        .iter()
        .map(|d| d.clone() as Arc<dyn DocumentContext>)
        .collect();

    let dispatch = dispatcher.dispatch(
        contexts,
        FillPayload {
            username: credential.username,
            secret: credential.secret,
        },
    );
    let skipped = dispatch.skipped.clone();
    let mut frames: Vec<FrameResult> = dispatch
        .collect()
        .await
        .into_iter()
        .map(|report| {
            let (identity_filled, secret_filled, error) = match &report.result {
                Ok(outcome) => (outcome.identity_filled, outcome.secret_filled, None),
                Err(e) => (false, false, Some(ErrorReport::from(e))),
            };
            FrameResult {
                context: report.context_id,
                hostname: report.hostname,
                identity_filled,
                secret_filled,
                error,
            }
        })
        .collect();

    // Reports arrive in completion order; present them in frame order.
    let order: Vec<String> = documents
        .iter()
        .map(|d| d.context_id().to_string())
        .collect();
    frames.sort_by_key(|f| order.iter().position(|id| *id == f.context));

    info!(%id, frames = frames.len(), skipped = skipped.len(), "fill dispatched");
    Ok((
        FillSummary {
            id,
            frames,
            skipped,
            out: None,
        },
        PageSnapshot::from_documents(&documents),
    ))
}

/// Load a page, fill it, and optionally write the result to `out`.
pub async fn fill_file(
    vault: &Vault,
    config: &LatchkeyConfig,
    id: CredentialId,
    page_path: &Path,
    out: Option<&Path>,
) -> Result<FillSummary, LatchkeyError> {
    let page = PageSnapshot::load(page_path)?;
    let dispatcher = FillDispatcher::from_config(&config.autofill)?;
    let (mut summary, filled) = fill(vault, &dispatcher, id, page).await?;
    if let Some(out) = out {
        std::fs::write(out, filled.to_json()?).map_err(|e| {
            LatchkeyError::Internal(format!("failed to write {}: {e}", out.display()))
        })?;
        summary.out = Some(out.display().to_string());
    }
    Ok(summary)
}

/// Vault state without authenticating. Never creates the database.
pub async fn status(config: &LatchkeyConfig) -> Result<StatusReport, LatchkeyError> {
    let storage = SqliteStorage::new(config.storage.clone());
    let database = config.storage.database_path.clone();
    if !storage.database_exists() {
        return Ok(StatusReport {
            database,
            exists: false,
            credentials: 0,
            failed_attempts: 0,
            locked_out_secs: None,
        });
    }

    storage.initialize().await?;
    let vault = Vault::new(Arc::new(storage), &config.vault);
    let auth = vault.auth_status().await?;
    let credentials = vault.summaries().await?.len();
    vault.close().await?;
    Ok(StatusReport {
        database,
        exists: auth.registered,
        credentials,
        failed_attempts: auth.failed_attempts,
        locked_out_secs: auth.retry_after.map(|d| d.as_secs().max(1)),
    })
}

/// Log unreadable records the way both front ends report them.
pub fn log_unreadable(unreadable: &[LatchkeyError]) {
    for err in unreadable {
        warn!(error = %err, "credential excluded from listing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_test_utils::TestEnv;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    async fn unlocked(env: &TestEnv) -> Vault {
        let mut vault = open_vault(&env.config).await.unwrap();
        init(&mut vault, &secret("master")).await.unwrap();
        vault
    }

    #[tokio::test]
    async fn unlock_requires_existing_vault() {
        let env = TestEnv::new().unwrap();
        let mut vault = open_vault(&env.config).await.unwrap();
        let err = unlock(&mut vault, &secret("master")).await.unwrap_err();
        assert!(matches!(err, LatchkeyError::Config(_)));
        assert!(!vault.exists().await.unwrap());
    }

    #[tokio::test]
    async fn init_twice_verifies() {
        let env = TestEnv::new().unwrap();
        let mut vault = open_vault(&env.config).await.unwrap();
        assert!(init(&mut vault, &secret("m")).await.unwrap().created);
        assert!(!init(&mut vault, &secret("m")).await.unwrap().created);
        assert!(matches!(
            init(&mut vault, &secret("other")).await.unwrap_err(),
            LatchkeyError::InvalidPassphrase
        ));
    }

    #[tokio::test]
    async fn list_masks_unless_revealed() {
        let env = TestEnv::new().unwrap();
        let vault = unlocked(&env).await;
        add(&vault, "example.com", "alice", &secret("correct-horse-battery"))
            .await
            .unwrap();

        let (masked, unreadable) = list(&vault, false).await.unwrap();
        assert!(unreadable.is_empty());
        assert_eq!(masked.entries[0].secret, "corr...tery");

        let (revealed, _) = list(&vault, true).await.unwrap();
        assert_eq!(revealed.entries[0].secret, "correct-horse-battery");
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let env = TestEnv::new().unwrap();
        let vault = unlocked(&env).await;
        assert!(matches!(
            get(&vault, CredentialId(42)).await.unwrap_err(),
            LatchkeyError::NotFound { id: CredentialId(42) }
        ));
    }

    #[tokio::test]
    async fn status_does_not_create_database() {
        let env = TestEnv::new().unwrap();
        let report = status(&env.config).await.unwrap();
        assert!(!report.exists);
        assert!(!env.database_path().exists());
    }

    #[tokio::test]
    async fn status_counts_records() {
        let env = TestEnv::new().unwrap();
        let vault = unlocked(&env).await;
        add(&vault, "a.com", "a", &secret("1")).await.unwrap();
        add(&vault, "b.com", "b", &secret("2")).await.unwrap();
        vault.close().await.unwrap();

        let report = status(&env.config).await.unwrap();
        assert!(report.exists);
        assert_eq!(report.credentials, 2);
        assert_eq!(report.locked_out_secs, None);
    }

    #[tokio::test]
    async fn fill_file_writes_filled_page_in_frame_order() {
        let env = TestEnv::new().unwrap();
        let vault = unlocked(&env).await;
        let id = add(&vault, "example.com", "alice", &secret("p@ss1"))
            .await
            .unwrap()
            .id;

        let page_path = env.dir().join("page.json");
        let out_path = env.dir().join("filled.json");
        std::fs::write(
            &page_path,
            r#"{"frames": [
                {"id": "top", "hostname": "example.com", "fields": [
                    {"type": "email", "name": "email"}, {"type": "password"}]},
                {"id": "inner", "hostname": "example.com", "fields": [{"type": "password"}]},
                {"id": "ad", "hostname": "ads.example.net", "fields": [{"type": "text"}]}
            ]}"#,
        )
        .unwrap();

        let summary = fill_file(&vault, &env.config, id, &page_path, Some(&out_path))
            .await
            .unwrap();
        let contexts: Vec<_> = summary.frames.iter().map(|f| f.context.as_str()).collect();
        assert_eq!(contexts, ["top", "inner"]);
        assert!(summary.frames[0].identity_filled && summary.frames[0].secret_filled);
        assert!(!summary.frames[1].identity_filled && summary.frames[1].secret_filled);
        assert_eq!(summary.skipped, ["ad"]);

        let filled = PageSnapshot::load(&out_path).unwrap();
        assert_eq!(filled.frames[0].fields[0].value.as_deref(), Some("alice"));
        assert_eq!(filled.frames[1].fields[0].value.as_deref(), Some("p@ss1"));
        assert_eq!(filled.frames[2].fields[0].value, None);
    }

    #[tokio::test]
    async fn configured_override_and_cross_origin_fill() {
        let env = TestEnv::builder()
            .with_override("login.example.org", Some("name=account"), Some("#pin"))
            .allow_cross_origin()
            .build()
            .unwrap();
        let vault = unlocked(&env).await;
        let id = add(&vault, "example.org", "bob", &secret("1234"))
            .await
            .unwrap()
            .id;

        let page = PageSnapshot::from_json(
            r#"{"frames": [
                {"id": "top", "hostname": "example.org"},
                {"id": "sso", "hostname": "login.example.org", "fields": [
                    {"type": "email", "name": "contact"},
                    {"type": "text", "name": "account"},
                    {"type": "password", "id": "pin"}
                ]}
            ]}"#,
        )
        .unwrap();
        let dispatcher = FillDispatcher::from_config(&env.config.autofill).unwrap();
        let (summary, filled) = fill(&vault, &dispatcher, id, page).await.unwrap();

        assert!(summary.skipped.is_empty());
        assert_eq!(filled.frames[1].fields[0].value, None);
        assert_eq!(filled.frames[1].fields[1].value.as_deref(), Some("bob"));
        assert_eq!(filled.frames[1].fields[2].value.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn fill_while_locked_is_refused() {
        let env = TestEnv::new().unwrap();
        let mut vault = unlocked(&env).await;
        let id = add(&vault, "a.com", "a", &secret("1")).await.unwrap().id;
        vault.lock();

        let page = PageSnapshot::from_json(r#"{"frames": [{"id": "top", "hostname": "a.com"}]}"#).unwrap();
        let dispatcher = FillDispatcher::from_config(&env.config.autofill).unwrap();
        assert!(matches!(
            fill(&vault, &dispatcher, id, page).await.unwrap_err(),
            LatchkeyError::Locked
        ));
    }
}

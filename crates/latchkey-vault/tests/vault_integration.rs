// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end vault behavior over SQLite and in-memory backends.

use std::collections::HashSet;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use latchkey_core::{CredentialId, LatchkeyError};
use latchkey_test_utils::{test_vault_config, MemoryStorage, TestEnv};
use latchkey_vault::{AuthOutcome, Vault};
use secrecy::{ExposeSecret, SecretString};

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

async fn unlocked_memory_vault() -> (Vault, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let mut vault = Vault::new(storage.clone(), &test_vault_config());
    vault.authenticate(&secret("master")).await.unwrap();
    (vault, storage)
}

fn record_key(id: CredentialId) -> String {
    format!("credential/{id}")
}

fn stored_record(storage: &MemoryStorage, id: CredentialId) -> serde_json::Value {
    serde_json::from_str(&storage.value(&record_key(id)).unwrap()).unwrap()
}

fn store_record(storage: &MemoryStorage, id: CredentialId, record: &serde_json::Value) {
    storage.insert(&record_key(id), &record.to_string());
}

#[tokio::test]
async fn alice_scenario_over_sqlite() {
    let env = TestEnv::new().unwrap();
    let mut vault = Vault::new(env.storage().await.unwrap(), &env.config.vault);

    assert!(!vault.exists().await.unwrap());
    assert_eq!(
        vault.authenticate(&secret("P")).await.unwrap(),
        AuthOutcome::Registered
    );

    let id = vault
        .add("example.com", "alice", &secret("p@ss1"))
        .await
        .unwrap();
    let listing = vault.list().await.unwrap();
    assert_eq!(listing.entries.len(), 1);
    assert!(listing.unreadable.is_empty());
    assert_eq!(listing.entries[0].username, "alice");
    assert_eq!(listing.entries[0].secret.expose_secret(), "p@ss1");

    assert!(vault.delete(id).await.unwrap());
    assert!(vault.list().await.unwrap().entries.is_empty());
    vault.close().await.unwrap();
}

#[tokio::test]
async fn credentials_survive_reopen_and_need_the_same_passphrase() {
    let env = TestEnv::new().unwrap();
    {
        let mut vault = Vault::new(env.storage().await.unwrap(), &env.config.vault);
        vault.authenticate(&secret("P")).await.unwrap();
        vault.add("example.com", "alice", &secret("p@ss1")).await.unwrap();
        vault.close().await.unwrap();
    }

    let mut vault = Vault::new(env.storage().await.unwrap(), &env.config.vault);
    assert!(vault.exists().await.unwrap());
    assert!(matches!(
        vault.authenticate(&secret("P'")).await.unwrap_err(),
        LatchkeyError::InvalidPassphrase
    ));
    assert_eq!(
        vault.authenticate(&secret("P")).await.unwrap(),
        AuthOutcome::Verified
    );
    let listing = vault.list().await.unwrap();
    assert_eq!(listing.entries[0].secret.expose_secret(), "p@ss1");
}

#[tokio::test]
async fn database_never_contains_plaintext_secret() {
    let env = TestEnv::new().unwrap();
    let mut vault = Vault::new(env.storage().await.unwrap(), &env.config.vault);
    vault.authenticate(&secret("master passphrase")).await.unwrap();
    vault
        .add("example.com", "alice", &secret("very-distinctive-secret"))
        .await
        .unwrap();
    vault.close().await.unwrap();

    let bytes = std::fs::read(env.database_path()).unwrap();
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(!haystack.contains("very-distinctive-secret"));
    assert!(!haystack.contains("master passphrase"));
}

#[tokio::test]
async fn identical_plaintexts_produce_distinct_ciphertexts() {
    let (vault, storage) = unlocked_memory_vault().await;
    let first = vault.add("a.com", "u", &secret("same")).await.unwrap();
    let second = vault.add("a.com", "u", &secret("same")).await.unwrap();

    let records = [stored_record(&storage, first), stored_record(&storage, second)];
    let nonces: HashSet<_> = records.iter().map(|r| r["secret"]["nonce"].clone()).collect();
    let ciphertexts: HashSet<_> = records
        .iter()
        .map(|r| r["secret"]["ciphertext"].clone())
        .collect();
    assert_eq!(nonces.len(), 2);
    assert_eq!(ciphertexts.len(), 2);
}

#[tokio::test]
async fn every_bit_flip_isolates_to_one_record() {
    let (vault, storage) = unlocked_memory_vault().await;
    let victim = vault.add("victim.com", "v", &secret("target")).await.unwrap();
    vault.add("bystander.com", "b", &secret("safe")).await.unwrap();

    let record = stored_record(&storage, victim);
    let original = BASE64
        .decode(record["secret"]["ciphertext"].as_str().unwrap())
        .unwrap();

    for bit in 0..original.len() * 8 {
        let mut flipped = original.clone();
        flipped[bit / 8] ^= 1 << (bit % 8);
        let mut tampered = record.clone();
        tampered["secret"]["ciphertext"] = BASE64.encode(&flipped).into();
        store_record(&storage, victim, &tampered);

        let listing = vault.list().await.unwrap();
        assert_eq!(listing.entries.len(), 1, "bit {bit}");
        assert_eq!(listing.entries[0].site, "bystander.com");
        assert_eq!(listing.unreadable.len(), 1);
        assert!(matches!(
            listing.unreadable[0],
            LatchkeyError::VaultCorrupted { id, .. } if id == victim
        ));
        assert!(matches!(
            vault.get(victim).await.unwrap_err(),
            LatchkeyError::VaultCorrupted { .. }
        ));
    }
}

/// Flips bits of the persisted text itself, so a flip may also break the
/// encoding around the ciphertext (quotes, escapes, control characters).
#[tokio::test]
async fn persisted_text_bit_flips_stay_in_one_record() {
    let (vault, storage) = unlocked_memory_vault().await;
    let victim = vault.add("victim.com", "v", &secret("target")).await.unwrap();
    let bystander = vault.add("bystander.com", "b", &secret("safe")).await.unwrap();

    let pristine = storage.value(&record_key(victim)).unwrap();
    let record = stored_record(&storage, victim);
    let mut ranges = Vec::new();
    for field in ["nonce", "ciphertext"] {
        let encoded = record["secret"][field].as_str().unwrap();
        let start = pristine.find(encoded).unwrap();
        ranges.push(start..start + encoded.len());
    }

    for index in ranges.into_iter().flatten() {
        for bit in 0..7 {
            let mut bytes = pristine.clone().into_bytes();
            bytes[index] ^= 1 << bit;
            let tampered = String::from_utf8(bytes).unwrap();
            storage.insert(&record_key(victim), &tampered);

            let listing = vault.list().await.unwrap_or_else(|e| {
                panic!("byte {index} bit {bit}: listing aborted: {e}")
            });
            assert_eq!(listing.entries.len(), 1, "byte {index} bit {bit}");
            assert_eq!(listing.entries[0].id, bystander);
            assert!(matches!(
                listing.unreadable.as_slice(),
                [LatchkeyError::VaultCorrupted { id, .. }] if *id == victim
            ));
            assert!(matches!(
                vault.get(victim).await.unwrap_err(),
                LatchkeyError::VaultCorrupted { .. }
            ));
            let kept = vault.get(bystander).await.unwrap().unwrap();
            assert_eq!(kept.secret.expose_secret(), "safe");
        }
    }
}

#[tokio::test]
async fn swapping_ciphertexts_between_records_is_detected() {
    let (vault, storage) = unlocked_memory_vault().await;
    let a = vault.add("a.com", "a", &secret("alpha")).await.unwrap();
    let b = vault.add("b.com", "b", &secret("bravo")).await.unwrap();

    let mut first = stored_record(&storage, a);
    let mut second = stored_record(&storage, b);
    std::mem::swap(&mut first["secret"], &mut second["secret"]);
    store_record(&storage, a, &first);
    store_record(&storage, b, &second);

    let listing = vault.list().await.unwrap();
    assert!(listing.entries.is_empty());
    let ids: HashSet<CredentialId> = listing
        .unreadable
        .iter()
        .filter_map(|e| match e {
            LatchkeyError::VaultCorrupted { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, HashSet::from([a, b]));
}

#[tokio::test]
async fn corrupted_record_can_still_be_deleted() {
    let (vault, storage) = unlocked_memory_vault().await;
    let id = vault.add("a.com", "a", &secret("alpha")).await.unwrap();

    let mut record = stored_record(&storage, id);
    record["secret"]["nonce"] = "!!!".into();
    store_record(&storage, id, &record);

    assert_eq!(vault.list().await.unwrap().unreadable.len(), 1);
    assert!(vault.delete(id).await.unwrap());
    let listing = vault.list().await.unwrap();
    assert!(listing.entries.is_empty() && listing.unreadable.is_empty());
}

#[tokio::test]
async fn delete_removes_exactly_one() {
    let (vault, _) = unlocked_memory_vault().await;
    let ids: Vec<_> = add_sites(&vault, 3).await;
    assert!(vault.delete(ids[1]).await.unwrap());
    assert!(!vault.delete(ids[1]).await.unwrap());

    let remaining: Vec<_> = vault.summaries().await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![ids[2], ids[0]]);
}

async fn add_sites(vault: &Vault, n: usize) -> Vec<CredentialId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(
            vault
                .add(&format!("site{i}.com"), "user", &secret("pw"))
                .await
                .unwrap(),
        );
    }
    ids
}

#[tokio::test]
async fn summaries_and_delete_work_while_locked() {
    let (mut vault, _) = unlocked_memory_vault().await;
    let id = vault.add("a.com", "a", &secret("alpha")).await.unwrap();
    vault.lock();

    assert!(matches!(vault.list().await.unwrap_err(), LatchkeyError::Locked));
    assert_eq!(vault.summaries().await.unwrap().len(), 1);
    assert!(vault.delete(id).await.unwrap());
}

#[tokio::test]
async fn lockout_then_reset_over_sqlite() {
    let env = TestEnv::builder().with_lockout(2, 60).build().unwrap();
    let mut vault = Vault::new(env.storage().await.unwrap(), &env.config.vault);
    vault.authenticate(&secret("right")).await.unwrap();

    for _ in 0..2 {
        assert!(matches!(
            vault.authenticate(&secret("wrong")).await.unwrap_err(),
            LatchkeyError::InvalidPassphrase
        ));
    }
    assert!(matches!(
        vault.authenticate(&secret("right")).await.unwrap_err(),
        LatchkeyError::LockedOut { .. }
    ));
    assert!(!vault.is_unlocked());

    let status = vault.auth_status().await.unwrap();
    assert!(status.registered);
    assert_eq!(status.failed_attempts, 2);
    assert!(status.retry_after.is_some());
}

#[tokio::test]
async fn memory_backend_never_sees_plaintext() {
    let (vault, storage) = unlocked_memory_vault().await;
    vault
        .add("example.com", "alice", &secret("another-distinctive-secret"))
        .await
        .unwrap();
    let dump = storage.dump();
    assert!(dump.contains("alice"));
    assert!(!dump.contains("another-distinctive-secret"));
}

#[tokio::test]
async fn lost_sequence_falls_back_to_highest_id() {
    let (vault, storage) = unlocked_memory_vault().await;
    let ids = add_sites(&vault, 2).await;
    storage.remove("credentialSeq");

    let next = vault.add("later.com", "u", &secret("pw")).await.unwrap();
    assert_eq!(next, CredentialId(ids[1].0 + 1));
}

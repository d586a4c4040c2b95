use super::*;
use shared::domain::{User, UserId};

fn alice() -> User {
    User {
        id: UserId(1),
        email: "alice@example.com".into(),
        name: "Alice".into(),
    }
}

#[test]
fn restore_without_persisted_state_yields_no_session() {
    let mut store = SessionStore::new(MemoryVault::default());
    assert!(store.restore().is_none());
    assert!(store.current().is_none());
}

#[test]
fn establish_then_restore_round_trips_through_the_vault() {
    let vault = MemoryVault::default();
    let mut store = SessionStore::new(vault);
    store
        .establish(alice(), "tok-123".into())
        .expect("establish");

    // A fresh store over the same vault sees the persisted session.
    let mut store = SessionStore::new(store.vault);
    let session = store.restore().expect("session");
    assert_eq!(session.user, alice());
    assert_eq!(session.token, "tok-123");
}

#[test]
fn corrupt_identity_is_purged_and_reported_as_no_session() {
    let vault = MemoryVault::default();
    vault.write(TOKEN_KEY, "tok-123").expect("write token");
    vault.write(USER_KEY, "{not json").expect("write user");

    let mut store = SessionStore::new(vault);
    assert!(store.restore().is_none());

    // Both keys are gone; the bad state does not survive.
    assert!(store.vault.read(TOKEN_KEY).expect("read").is_none());
    assert!(store.vault.read(USER_KEY).expect("read").is_none());
}

#[test]
fn missing_token_yields_no_session_even_with_identity_present() {
    let vault = MemoryVault::default();
    vault
        .write(USER_KEY, &serde_json::to_string(&alice()).expect("json"))
        .expect("write user");

    let mut store = SessionStore::new(vault);
    assert!(store.restore().is_none());
}

#[test]
fn clear_removes_memory_and_persistence() {
    let mut store = SessionStore::new(MemoryVault::default());
    store
        .establish(alice(), "tok-123".into())
        .expect("establish");
    store.clear();

    assert!(store.current().is_none());
    assert!(store.restore().is_none());
}

#[test]
fn memory_vault_keeps_working_after_a_poisoned_lock() {
    use std::sync::Arc;

    let vault = Arc::new(MemoryVault::default());
    vault.write(TOKEN_KEY, "tok-123").expect("write");

    let poisoner = Arc::clone(&vault);
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.entries.lock().expect("lock");
        panic!("poison the entries lock");
    })
    .join();

    assert_eq!(
        vault.read(TOKEN_KEY).expect("read").as_deref(),
        Some("tok-123")
    );
    vault.remove(TOKEN_KEY).expect("remove");
    assert!(vault.read(TOKEN_KEY).expect("read").is_none());
}

#[test]
fn file_vault_persists_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let vault_dir = dir.path().join("session");

    let mut store = SessionStore::new(FileVault::new(&vault_dir));
    store
        .establish(alice(), "tok-123".into())
        .expect("establish");

    let mut store = SessionStore::new(FileVault::new(&vault_dir));
    let session = store.restore().expect("session");
    assert_eq!(session.token, "tok-123");

    store.clear();
    let mut store = SessionStore::new(FileVault::new(&vault_dir));
    assert!(store.restore().is_none());
}

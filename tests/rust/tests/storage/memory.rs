//! In-memory credential store

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tests::fixtures;
use wpbridge_core::{CredentialStore, StorageError};
use wpbridge_storage::MemoryCredentialStore;

#[tokio::test]
async fn test_sessions_are_isolated() {
    let store = MemoryCredentialStore::new();
    let alice = fixtures::session("alice");
    let bob = fixtures::session("bob");

    store.save(&alice, &fixtures::example_credential()).await.unwrap();

    assert!(store.load(&bob).await.is_none());
    store.clear(&bob).await.unwrap();
    assert_eq!(store.load(&alice).await, Some(fixtures::example_credential()));
}

#[tokio::test]
async fn test_unidentified_session() {
    let store = MemoryCredentialStore::new();

    let result = store
        .save(&fixtures::session(""), &fixtures::example_credential())
        .await;

    assert_eq!(result, Err(StorageError::UnidentifiedSession));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_concurrent_writers_never_tear() {
    let store = Arc::new(MemoryCredentialStore::new());
    let session = fixtures::session("user-1");

    let writers: Vec<_> = (0..32)
        .map(|i| {
            let store = store.clone();
            let session = session.clone();
            tokio::spawn(async move {
                let credential = fixtures::credential(
                    &format!("https://site{}.example.com", i),
                    &format!("token-{}", i),
                );
                store.save(&session, &credential).await.unwrap();
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap();
    }

    let stored = store.load(&session).await.unwrap();
    let index = stored.token.strip_prefix("token-").unwrap();
    assert_eq!(
        stored.base_url.as_str(),
        format!("https://site{}.example.com/", index)
    );
    assert_eq!(store.len(), 1);
}

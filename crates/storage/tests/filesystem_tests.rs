// Filesystem backend behavior under concurrent writers and across namespaces.

mod common;

use bytes::Bytes;
use coffer_storage::{FilesystemBackend, ObjectStore, StorageError};
use common::{ObjectSpec, sha256_hash};
use futures::StreamExt;
use std::sync::Arc;
use tempfile::TempDir;

async fn read_all(store: &dyn ObjectStore, key: &str) -> Vec<u8> {
    let mut stream = store.get_stream(key).await.unwrap();
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn test_parallel_uploads_to_distinct_keys() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn ObjectStore> =
        Arc::new(FilesystemBackend::new(temp_dir.path()).await.unwrap());

    let specs: Vec<ObjectSpec> = (0..32)
        .map(|i| {
            let owner = if i % 2 == 0 { "alice" } else { "bob" };
            ObjectSpec::new(owner, i, 4096 + i as usize)
        })
        .collect();

    let mut handles = Vec::new();
    for spec in &specs {
        let store = store.clone();
        let key = spec.key();
        let data = spec.data.clone();
        handles.push(tokio::spawn(async move {
            let mut upload = store.put_stream(&key).await?;
            for chunk in data.chunks(1000) {
                upload.write(Bytes::copy_from_slice(chunk)).await?;
            }
            upload.finish().await
        }));
    }

    for (handle, spec) in handles.into_iter().zip(&specs) {
        let written = handle.await.unwrap().unwrap();
        assert_eq!(written, spec.data.len() as u64);
    }

    for spec in &specs {
        let read = read_all(store.as_ref(), &spec.key()).await;
        assert_eq!(sha256_hash(&read), sha256_hash(&spec.data));
    }

    // Namespaces are plain directories under the root.
    assert!(temp_dir.path().join("alice").is_dir());
    assert!(temp_dir.path().join("bob").is_dir());
}

#[tokio::test]
async fn test_concurrent_writers_same_key_single_winner() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn ObjectStore> =
        Arc::new(FilesystemBackend::new(temp_dir.path()).await.unwrap());

    let mut handles = Vec::new();
    for seed in 0..8u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let spec = ObjectSpec::new("alice", seed, 2048);
            store
                .put("alice/contested", spec.data.clone())
                .await
                .map(|()| spec.data)
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(data) => winners.push(data),
            Err(StorageError::AlreadyExists(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners.len(), 1, "exactly one writer should publish");
    let stored = store.get("alice/contested").await.unwrap();
    assert_eq!(stored, winners[0]);
}

#[tokio::test]
async fn test_namespaces_do_not_overlap() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemBackend::new(temp_dir.path()).await.unwrap();

    let alice = ObjectSpec::new("alice", 1, 100);
    store.put(&alice.key(), alice.data.clone()).await.unwrap();

    let bobs_view = format!("bob/{}", alice.name);
    assert!(!store.exists(&bobs_view).await.unwrap());
    assert!(matches!(
        store.get(&bobs_view).await,
        Err(StorageError::NotFound(_))
    ));
}

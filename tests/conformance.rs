//! One contract suite, every backend. The engine's observable semantics must
//! not depend on which backend is active, so the same assertions run against
//! each implementation.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::sleep;

use tablekv::store::{
    Backend, FileBackend, ListOptions, MemoryBackend, ReadOptions, Store, StoreConfig, StoreError,
    WriteOptions,
};

fn store_over(backend: Arc<dyn Backend>) -> Arc<Store> {
    let config = StoreConfig {
        reap_interval_ms: 50,
        ..StoreConfig::default()
    };
    Arc::new(Store::with_backend(backend, &config))
}

#[tokio::test]
async fn test_memory_backend_conforms() {
    let store = store_over(Arc::new(MemoryBackend::new()));
    conformance(store.clone()).await;
    store.shutdown();
}

#[tokio::test]
async fn test_file_backend_conforms() {
    let dir = TempDir::new().unwrap();
    let backend = FileBackend::open(dir.path(), u64::MAX).unwrap();
    let store = store_over(Arc::new(backend));
    conformance(store.clone()).await;
    store.shutdown();
}

async fn conformance(store: Arc<Store>) {
    round_trip(&store).await;
    overwrite_replaces(&store).await;
    delete_semantics(&store).await;
    prefix_completeness(&store).await;
    pagination_composability(&store).await;
    expiry_visibility(&store).await;
    concurrent_writers(store.clone()).await;
}

async fn round_trip(store: &Store) {
    store
        .write(None, "rt", b"value".to_vec(), WriteOptions::default())
        .await
        .unwrap();

    let records = store.read(None, "rt", ReadOptions::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "rt");
    assert_eq!(records[0].value, b"value");

    // Empty values are legal
    store
        .write(None, "rt-empty", Vec::new(), WriteOptions::default())
        .await
        .unwrap();
    let records = store.read(None, "rt-empty", ReadOptions::default()).await.unwrap();
    assert!(records[0].value.is_empty());
}

async fn overwrite_replaces(store: &Store) {
    store
        .write(
            None,
            "ow",
            b"v1".to_vec(),
            WriteOptions {
                ttl: Some(Duration::from_secs(3600)),
            },
        )
        .await
        .unwrap();
    store
        .write(None, "ow", b"v2".to_vec(), WriteOptions::default())
        .await
        .unwrap();

    let records = store.read(None, "ow", ReadOptions::default()).await.unwrap();
    assert_eq!(records[0].value, b"v2");
    assert_eq!(records[0].expires_at, None, "overwrite must clear the old expiry");
}

async fn delete_semantics(store: &Store) {
    store
        .write(None, "del", b"v".to_vec(), WriteOptions::default())
        .await
        .unwrap();
    store.delete(None, "del").await.unwrap();

    let err = store.read(None, "del", ReadOptions::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::KeyNotFound(_)));

    // Idempotent on missing keys
    store.delete(None, "del").await.unwrap();
    store.delete(None, "never-existed").await.unwrap();
}

async fn prefix_completeness(store: &Store) {
    for (key, value) in [("pfx/a", "1"), ("pfx/b", "2"), ("pfx/c", "3"), ("other", "x")] {
        store
            .write(None, key, value.as_bytes().to_vec(), WriteOptions::default())
            .await
            .unwrap();
    }

    let records = store
        .read(
            None,
            "pfx/",
            ReadOptions {
                prefix: true,
                ..ReadOptions::default()
            },
        )
        .await
        .unwrap();

    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["pfx/a", "pfx/b", "pfx/c"]);

    let values: Vec<&[u8]> = records.iter().map(|r| r.value.as_slice()).collect();
    assert_eq!(values, vec![b"1".as_slice(), b"2".as_slice(), b"3".as_slice()]);

    // No match is an empty result, not an error
    let records = store
        .read(
            None,
            "pfx/zzz",
            ReadOptions {
                prefix: true,
                ..ReadOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(records.is_empty());
}

async fn pagination_composability(store: &Store) {
    for i in 0..8 {
        store
            .write(None, &format!("page/{i}"), Vec::new(), WriteOptions::default())
            .await
            .unwrap();
    }

    let full = store
        .list(
            None,
            ListOptions {
                prefix: Some("page/".to_string()),
                ..ListOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(full.len(), 8);

    for offset in 0..10u64 {
        for limit in 0..4u64 {
            let page = store
                .list(
                    None,
                    ListOptions {
                        prefix: Some("page/".to_string()),
                        limit: Some(limit),
                        offset,
                    },
                )
                .await
                .unwrap();

            let start = (offset as usize).min(full.len());
            let end = if limit == 0 {
                full.len()
            } else {
                (start + limit as usize).min(full.len())
            };
            assert_eq!(page, full[start..end], "offset={offset} limit={limit}");
        }
    }
}

async fn expiry_visibility(store: &Store) {
    store
        .write(
            None,
            "exp",
            b"v".to_vec(),
            WriteOptions {
                ttl: Some(Duration::from_millis(80)),
            },
        )
        .await
        .unwrap();

    assert!(store.read(None, "exp", ReadOptions::default()).await.is_ok());

    sleep(Duration::from_millis(150)).await;

    let err = store.read(None, "exp", ReadOptions::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::KeyNotFound(_)));

    let records = store
        .read(
            None,
            "exp",
            ReadOptions {
                prefix: true,
                ..ReadOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(records.is_empty());

    let keys = store
        .list(
            None,
            ListOptions {
                prefix: Some("exp".to_string()),
                ..ListOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(keys.is_empty());
}

async fn concurrent_writers(store: Arc<Store>) {
    let mut handles = Vec::new();
    for i in 0..8u8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .write(None, "contended", vec![i; 4], WriteOptions::default())
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let records = store.read(None, "contended", ReadOptions::default()).await.unwrap();
    let value = &records[0].value;
    assert_eq!(value.len(), 4);
    // Exactly one writer's value, never a mix
    assert!(value.iter().all(|b| *b == value[0]));
}

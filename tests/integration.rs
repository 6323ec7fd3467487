use std::sync::Arc;

use tempfile::TempDir;

use tablekv::api::rpc::example;
use tablekv::store::{
    BackendKind, ListOptions, ReadOptions, Store, StoreConfig, StoreError, WriteOptions,
};

fn file_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        backend: BackendKind::File,
        data_dir: dir.path().join("tables").to_str().unwrap().to_string(),
        default_table: "default".to_string(),
        reap_interval_ms: 100,
        request_timeout_secs: Some(15),
        max_log_bytes: 1024 * 1024,
    }
}

/// The observed CLI scenario, end to end over a durable store.
#[tokio::test]
async fn test_store_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(file_config(&temp_dir)).unwrap();

    // Reading before anything is written fails with "not found"
    let err = store
        .read(None, "somekey", ReadOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));

    store
        .write(None, "somekey", b"val1".to_vec(), WriteOptions::default())
        .await
        .unwrap();

    let records = store.read(None, "somekey", ReadOptions::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, b"val1");

    store.delete(None, "somekey").await.unwrap();
    let err = store
        .read(None, "somekey", ReadOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));

    // Prefixes
    store
        .write(None, "somekey1", b"val1".to_vec(), WriteOptions::default())
        .await
        .unwrap();
    store
        .write(None, "somekey2", b"val2".to_vec(), WriteOptions::default())
        .await
        .unwrap();

    // The exact key "somekey" still does not exist
    let err = store
        .read(None, "somekey", ReadOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::KeyNotFound(_)));

    let records = store
        .read(
            None,
            "somekey",
            ReadOptions {
                prefix: true,
                ..ReadOptions::default()
            },
        )
        .await
        .unwrap();
    let values: Vec<&[u8]> = records.iter().map(|r| r.value.as_slice()).collect();
    assert_eq!(values, vec![b"val1".as_slice(), b"val2".as_slice()]);
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["somekey1", "somekey2"]);

    let listed = store.list(None, ListOptions::default()).await.unwrap();
    assert!(listed.contains(&"somekey1".to_string()));
    assert!(listed.contains(&"somekey2".to_string()));

    store.shutdown();
}

/// Data written through one store instance is visible after reopening the
/// same data directory.
#[tokio::test]
async fn test_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = Store::open(file_config(&temp_dir)).unwrap();
        store
            .write(None, "persisted", b"still here".to_vec(), WriteOptions::default())
            .await
            .unwrap();
        store.shutdown();
    }

    let store = Store::open(file_config(&temp_dir)).unwrap();
    let records = store.read(None, "persisted", ReadOptions::default()).await.unwrap();
    assert_eq!(records[0].value, b"still here");
    store.shutdown();
}

/// The example service method set, invoked in-process the way a deployed
/// service would call the store.
#[tokio::test]
async fn test_example_service_methods() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(file_config(&temp_dir)).unwrap();

    example::test_list(&store).await.unwrap();
    example::test_list_limit(&store).await.unwrap();
    example::test_list_offset(&store).await.unwrap();
    example::test_expiry(&store).await.unwrap();

    store.shutdown();
}

/// Full HTTP round trip: the CLI's ApiClient against a running API server.
#[tokio::test]
async fn test_http_facade_round_trip() {
    use std::time::Duration;

    use tablekv::ctl::client::ApiClient;

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(file_config(&temp_dir)).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = tablekv::api::app(store.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(
        &format!("http://{addr}"),
        None,
        Duration::from_secs(15),
    )
    .unwrap();

    // Read of a missing key surfaces the server's "not found" message
    let err = client.read("somekey", false, None, 0).await.unwrap_err();
    assert!(err.to_string().contains("not found"));

    client.write("somekey1", b"val1", None).await.unwrap();
    client.write("somekey2", b"val2", None).await.unwrap();

    let records = client.read("somekey", true, None, 0).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key, "somekey1");
    assert_eq!(records[1].key, "somekey2");

    let keys = client.list(None, None, 0).await.unwrap();
    assert_eq!(keys, vec!["somekey1".to_string(), "somekey2".to_string()]);

    let keys = client.list(Some("somekey"), Some(1), 1).await.unwrap();
    assert_eq!(keys, vec!["somekey2".to_string()]);

    client.delete("somekey1").await.unwrap();
    // Idempotent delete over HTTP as well
    client.delete("somekey1").await.unwrap();

    let keys = client.list(None, None, 0).await.unwrap();
    assert_eq!(keys, vec!["somekey2".to_string()]);

    // RPC dispatch: the example service method set
    let http = reqwest::Client::new();
    for method in ["TestList", "TestListLimit", "TestListOffset"] {
        let resp = http
            .post(format!("http://{addr}/rpc/example/{method}"))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "{method} failed");
    }

    let resp = http
        .post(format!("http://{addr}/rpc/example/NoSuchMethod"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    store.shutdown();
}

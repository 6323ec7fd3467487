//! Self-check methods of the deployed example service. Each one drives the
//! store through its programmatic API and fails the call when an observable
//! contract is violated, so a remote caller can probe a running deployment.

use std::time::Duration;

use tokio::time::sleep;

use crate::api::error::ApiError;
use crate::store::{ListOptions, ReadOptions, Store, StoreError, WriteOptions};

const TABLE: &str = "example";

fn check(cond: bool, msg: &str) -> Result<(), ApiError> {
    if cond {
        Ok(())
    } else {
        Err(ApiError::CheckFailed(msg.to_string()))
    }
}

/// Clear the scratch table so reruns start from a known state.
async fn reset(store: &Store) -> Result<(), ApiError> {
    let keys = store.list(Some(TABLE), ListOptions::default()).await?;
    for key in keys {
        store.delete(Some(TABLE), &key).await?;
    }
    Ok(())
}

/// A record written with a TTL must disappear from read, prefix read and
/// list once the TTL elapses, while TTL-less records stay.
pub async fn test_expiry(store: &Store) -> Result<(), ApiError> {
    reset(store).await?;

    store
        .write(
            Some(TABLE),
            "expires",
            b"ephemeral".to_vec(),
            WriteOptions {
                ttl: Some(Duration::from_secs(1)),
            },
        )
        .await?;
    store
        .write(Some(TABLE), "stays", b"durable".to_vec(), WriteOptions::default())
        .await?;

    let records = store
        .read(Some(TABLE), "expires", ReadOptions::default())
        .await?;
    check(records.len() == 1, "record unreadable before its TTL elapsed")?;

    sleep(Duration::from_millis(1500)).await;

    match store.read(Some(TABLE), "expires", ReadOptions::default()).await {
        Err(StoreError::KeyNotFound(_)) => {}
        Ok(_) => return Err(ApiError::CheckFailed("expired record still readable".to_string())),
        Err(e) => return Err(e.into()),
    }

    let records = store
        .read(
            Some(TABLE),
            "",
            ReadOptions {
                prefix: true,
                ..ReadOptions::default()
            },
        )
        .await?;
    check(
        records.iter().all(|r| r.key != "expires"),
        "expired record surfaced by prefix read",
    )?;

    let keys = store.list(Some(TABLE), ListOptions::default()).await?;
    check(!keys.contains(&"expires".to_string()), "expired record surfaced by list")?;
    check(keys.contains(&"stays".to_string()), "TTL-less record vanished")?;

    Ok(())
}

/// List returns every live key in ascending order.
pub async fn test_list(store: &Store) -> Result<(), ApiError> {
    reset(store).await?;

    for i in 0..5 {
        store
            .write(
                Some(TABLE),
                &format!("key{i:02}"),
                format!("val{i}").into_bytes(),
                WriteOptions::default(),
            )
            .await?;
    }

    let keys = store.list(Some(TABLE), ListOptions::default()).await?;
    check(keys.len() == 5, "list missed records")?;

    let expected: Vec<String> = (0..5).map(|i| format!("key{i:02}")).collect();
    check(keys == expected, "list out of key order")?;

    Ok(())
}

/// A limited list is a prefix of the full ordered listing, and limit zero
/// means no cap.
pub async fn test_list_limit(store: &Store) -> Result<(), ApiError> {
    reset(store).await?;

    for i in 0..10 {
        store
            .write(
                Some(TABLE),
                &format!("key{i:02}"),
                Vec::new(),
                WriteOptions::default(),
            )
            .await?;
    }

    let full = store.list(Some(TABLE), ListOptions::default()).await?;
    check(full.len() == 10, "list missed records")?;

    for limit in [1u64, 3, 10, 25] {
        let page = store
            .list(
                Some(TABLE),
                ListOptions {
                    limit: Some(limit),
                    ..ListOptions::default()
                },
            )
            .await?;
        let want = &full[..(limit as usize).min(full.len())];
        check(page == want, &format!("limit={limit} returned the wrong slice"))?;
    }

    let uncapped = store
        .list(
            Some(TABLE),
            ListOptions {
                limit: Some(0),
                ..ListOptions::default()
            },
        )
        .await?;
    check(uncapped == full, "limit=0 should mean no cap")?;

    Ok(())
}

/// Offset skips matches; an offset past the end is empty, not an error, and
/// limit and offset compose into the `[O..O+L]` slice of the full listing.
pub async fn test_list_offset(store: &Store) -> Result<(), ApiError> {
    reset(store).await?;

    for i in 0..10 {
        store
            .write(
                Some(TABLE),
                &format!("key{i:02}"),
                Vec::new(),
                WriteOptions::default(),
            )
            .await?;
    }

    let full = store.list(Some(TABLE), ListOptions::default()).await?;

    for offset in [0u64, 3, 9, 10, 50] {
        let page = store
            .list(
                Some(TABLE),
                ListOptions {
                    offset,
                    ..ListOptions::default()
                },
            )
            .await?;
        let want = &full[(offset as usize).min(full.len())..];
        check(page == want, &format!("offset={offset} returned the wrong slice"))?;
    }

    let window = store
        .list(
            Some(TABLE),
            ListOptions {
                limit: Some(4),
                offset: 3,
                ..ListOptions::default()
            },
        )
        .await?;
    check(window == full[3..7], "limit and offset did not compose")?;

    Ok(())
}

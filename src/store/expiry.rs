use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::time::sleep;

use crate::store::backend::Backend;
use crate::store::metrics;
use crate::store::types::now_nanos;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExpiryEvent {
    table: String,
    key: String,
    expires_at: u64,
}

// Reversed so the BinaryHeap pops the earliest expiry first
impl Ord for ExpiryEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.expires_at.cmp(&self.expires_at)
    }
}

impl PartialOrd for ExpiryEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Background reaper that physically removes expired records. Visibility does
/// not depend on it: the engine filters expired records at read time, the
/// reaper only bounds physical growth.
#[derive(Debug)]
pub struct ExpiryReaper {
    backend: Arc<dyn Backend>,
    queue: Arc<Mutex<BinaryHeap<ExpiryEvent>>>,
    shutdown_tx: parking_lot::Mutex<Option<oneshot::Sender<()>>>,
}

impl ExpiryReaper {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            queue: Arc::new(Mutex::new(BinaryHeap::new())),
            shutdown_tx: parking_lot::Mutex::new(None),
        }
    }

    pub async fn add(&self, table: String, key: String, expires_at: u64) {
        let mut queue = self.queue.lock().await;
        queue.push(ExpiryEvent {
            table,
            key,
            expires_at,
        });
    }

    pub fn start(&self, interval: Duration) {
        let (tx, mut rx) = oneshot::channel();
        *self.shutdown_tx.lock() = Some(tx);

        let backend = self.backend.clone();
        let queue = self.queue.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sleep(interval) => {
                        let mut due = Vec::new();
                        {
                            let now = now_nanos();
                            let mut queue = queue.lock().await;
                            while let Some(event) = queue.peek() {
                                if event.expires_at <= now {
                                    due.push(queue.pop().unwrap());
                                } else {
                                    break;
                                }
                            }
                        }

                        for event in due {
                            reap(&backend, &event).await;
                        }
                    }
                    _ = &mut rx => {
                        tracing::debug!("expiry reaper shutting down");
                        break;
                    }
                }
            }
        });
    }

    pub fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }
    }
}

/// A heap event may be stale: the key can have been overwritten since, with a
/// later expiry or none at all. Re-check before deleting.
async fn reap(backend: &Arc<dyn Backend>, event: &ExpiryEvent) {
    let current = match backend.read(&event.table, &event.key).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(table = %event.table, key = %event.key, error = %e, "failed to check expired key");
            return;
        }
    };

    match current {
        Some(record) if record.is_expired() => {
            match backend.delete(&event.table, &event.key).await {
                Ok(()) => {
                    metrics::REAPED.inc();
                    tracing::trace!(table = %event.table, key = %event.key, "reaped expired record");
                }
                Err(e) => {
                    tracing::warn!(table = %event.table, key = %event.key, error = %e, "failed to delete expired key");
                }
            }
        }
        _ => {}
    }
}

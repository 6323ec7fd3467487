use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::store::backend::Backend;
use crate::store::error::StoreError;
use crate::store::expiry::ExpiryReaper;
use crate::store::file::FileBackend;
use crate::store::memory::MemoryBackend;
use crate::store::metrics;
use crate::store::types::{BackendKind, ListOptions, ReadOptions, Record, StoreConfig, WriteOptions};

/// The store engine. Validates requests, enforces expiry visibility, applies
/// prefix matching and limit/offset pagination, and dispatches to the active
/// backend under the configured request deadline.
///
/// Construct with [`Store::open`], release with [`Store::shutdown`].
#[derive(Debug)]
pub struct Store {
    backend: Arc<dyn Backend>,
    reaper: Arc<ExpiryReaper>,
    default_table: String,
    request_timeout: Option<Duration>,
}

impl Store {
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn Backend> = match config.backend {
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
            BackendKind::File => Arc::new(FileBackend::open(&config.data_dir, config.max_log_bytes)?),
        };
        Ok(Self::with_backend(backend, &config))
    }

    /// Build a store over an already-constructed backend. The conformance
    /// tests use this to run one suite against every backend.
    pub fn with_backend(backend: Arc<dyn Backend>, config: &StoreConfig) -> Self {
        let reaper = Arc::new(ExpiryReaper::new(backend.clone()));
        reaper.start(Duration::from_millis(config.reap_interval_ms));

        Self {
            backend,
            reaper,
            default_table: config.default_table.clone(),
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn shutdown(&self) {
        self.reaper.shutdown();
    }

    /// Upsert a record. A previous record under the same key is replaced in
    /// full: a write without a TTL clears any earlier expiry.
    pub async fn write(
        &self,
        table: Option<&str>,
        key: &str,
        value: Vec<u8>,
        opts: WriteOptions,
    ) -> Result<(), StoreError> {
        validate_key(key)?;
        let table = self.table(table);

        let record = Record::new(key.to_string(), value, opts.ttl);
        let expires_at = record.expires_at;

        self.dispatch(self.backend.write(&table, record)).await?;
        metrics::WRITES.inc();

        if let Some(expiry) = expires_at {
            self.reaper.add(table, key.to_string(), expiry).await;
        }
        Ok(())
    }

    /// Exact-key read, or every record under a key prefix when
    /// `opts.prefix` is set.
    ///
    /// Exact mode fails with [`StoreError::KeyNotFound`] for a missing or
    /// expired key; the two cases are indistinguishable. Prefix mode returns
    /// an empty vector when nothing matches.
    pub async fn read(
        &self,
        table: Option<&str>,
        key: &str,
        opts: ReadOptions,
    ) -> Result<Vec<Record>, StoreError> {
        let table = self.table(table);

        if opts.prefix {
            let records = self.dispatch(self.backend.read_prefix(&table, key)).await?;
            metrics::READS.inc();

            let live = records.into_iter().filter(|r| !r.is_expired());
            return Ok(paginate(live, opts.offset, opts.limit));
        }

        validate_key(key)?;
        let record = self.dispatch(self.backend.read(&table, key)).await?;
        metrics::READS.inc();

        match record {
            Some(record) if !record.is_expired() => Ok(vec![record]),
            Some(_) => {
                // Lazily purge; visibility does not depend on this succeeding
                if let Err(e) = self.backend.delete(&table, key).await {
                    tracing::debug!(table = %table, key = %key, error = %e, "failed to purge expired record");
                }
                Err(StoreError::KeyNotFound(key.to_string()))
            }
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    /// Enumerate keys in ascending order, prefix-filtered, then paginated.
    /// `List(limit=L, offset=O)` returns the same slice the full listing
    /// would at `[O..O+L]`.
    pub async fn list(&self, table: Option<&str>, opts: ListOptions) -> Result<Vec<String>, StoreError> {
        let table = self.table(table);
        let prefix = opts.prefix.unwrap_or_default();

        let keys = self.dispatch(self.backend.list(&table, &prefix)).await?;
        metrics::LISTS.inc();

        Ok(paginate(keys.into_iter(), opts.offset, opts.limit))
    }

    /// Idempotent delete: removing a missing or already-expired key succeeds.
    pub async fn delete(&self, table: Option<&str>, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let table = self.table(table);

        self.dispatch(self.backend.delete(&table, key)).await?;
        metrics::DELETES.inc();
        Ok(())
    }

    fn table(&self, table: Option<&str>) -> String {
        match table {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self.default_table.clone(),
        }
    }

    /// Every backend call runs under the configured deadline. No retries: a
    /// timed-out or failed call is reported to the caller as-is.
    async fn dispatch<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.request_timeout {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .map_err(|_| StoreError::Timeout(deadline))?,
            None => fut.await,
        }
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidArgument("key must not be empty".to_string()));
    }
    Ok(())
}

/// `limit` of zero or `None` means no cap; an offset past the end yields an
/// empty result, not an error.
fn paginate<T>(items: impl Iterator<Item = T>, offset: u64, limit: Option<u64>) -> Vec<T> {
    let skipped = items.skip(offset as usize);
    match limit {
        Some(limit) if limit > 0 => skipped.take(limit as usize).collect(),
        _ => skipped.collect(),
    }
}

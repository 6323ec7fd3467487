use async_trait::async_trait;

use crate::store::error::StoreError;
use crate::store::types::Record;

/// Storage backend capability set. Every implementation must agree on key
/// ordering (lexicographic, byte-wise) so the engine's pagination produces
/// identical slices regardless of the active backend; the conformance tests
/// in `tests/conformance.rs` run unchanged against each implementation.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Upsert a record. Replaces any existing record under the same key in
    /// full, including its expiry.
    async fn write(&self, table: &str, record: Record) -> Result<(), StoreError>;

    /// Exact-key lookup. Returns the raw record even when expired; expiry
    /// visibility is enforced by the engine.
    async fn read(&self, table: &str, key: &str) -> Result<Option<Record>, StoreError>;

    /// All records whose key starts with `prefix`, in ascending key order.
    /// An empty prefix matches every record. May include expired records.
    async fn read_prefix(&self, table: &str, prefix: &str) -> Result<Vec<Record>, StoreError>;

    /// Keys matching `prefix` in ascending order. Expired entries are
    /// excluded here rather than by the engine: a bare key carries no expiry
    /// across this boundary.
    async fn list(&self, table: &str, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Remove a record. Removing an absent key is not an error.
    async fn delete(&self, table: &str, key: &str) -> Result<(), StoreError>;
}

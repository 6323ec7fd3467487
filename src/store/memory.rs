use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::store::backend::Backend;
use crate::store::error::StoreError;
use crate::store::types::Record;

/// Reference backend. Each table is an ordered map behind its own lock, so
/// writes to one key are atomic whole-record replacements and scans come out
/// in key order for free.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: DashMap<String, RwLock<BTreeMap<String, Record>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    fn with_table<T>(&self, table: &str, f: impl FnOnce(&RwLock<BTreeMap<String, Record>>) -> T) -> T {
        let entry = self
            .tables
            .entry(table.to_string())
            .or_insert_with(|| RwLock::new(BTreeMap::new()));
        f(entry.value())
    }
}

fn prefix_range<'a>(
    map: &'a BTreeMap<String, Record>,
    prefix: &str,
) -> impl Iterator<Item = (&'a String, &'a Record)> + 'a {
    let prefix = prefix.to_string();
    map.range::<String, _>((Bound::Included(prefix.clone()), Bound::Unbounded))
        .take_while(move |(k, _)| k.starts_with(&prefix))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn write(&self, table: &str, record: Record) -> Result<(), StoreError> {
        self.with_table(table, |t| {
            t.write().insert(record.key.clone(), record);
        });
        Ok(())
    }

    async fn read(&self, table: &str, key: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.with_table(table, |t| t.read().get(key).cloned()))
    }

    async fn read_prefix(&self, table: &str, prefix: &str) -> Result<Vec<Record>, StoreError> {
        Ok(self.with_table(table, |t| {
            let map = t.read();
            prefix_range(&map, prefix).map(|(_, r)| r.clone()).collect()
        }))
    }

    async fn list(&self, table: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.with_table(table, |t| {
            let map = t.read();
            prefix_range(&map, prefix)
                .filter(|(_, r)| !r.is_expired())
                .map(|(k, _)| k.clone())
                .collect()
        }))
    }

    async fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        self.with_table(table, |t| {
            t.write().remove(key);
        });
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use crc32fast::Hasher;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::store::backend::Backend;
use crate::store::error::StoreError;
use crate::store::types::Record;

/// Durable backend. Each table is an append-only log of framed operations
/// plus an in-memory ordered index rebuilt by replaying the log on open.
/// The log is rewritten from the live index once it outgrows `max_log_bytes`.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    max_log_bytes: u64,
    tables: DashMap<String, Arc<FileTable>>,
}

#[derive(Debug, Serialize, Deserialize)]
enum LogOp {
    Set(Record),
    Del(String),
}

// Frame layout: [u32 payload len][bincode payload][u32 crc32 of payload]
const FRAME_OVERHEAD: usize = 8;

fn encode_op(op: &LogOp) -> Result<Vec<u8>, StoreError> {
    let payload = bincode::serialize(op)?;

    let mut buf = BytesMut::with_capacity(payload.len() + FRAME_OVERHEAD);
    buf.put_u32(payload.len() as u32);
    buf.put(&payload[..]);

    let mut hasher = Hasher::new();
    hasher.update(&payload);
    buf.put_u32(hasher.finalize());

    Ok(buf.to_vec())
}

fn decode_op(data: &[u8], offset: usize) -> Result<(LogOp, usize), StoreError> {
    let corrupt = |reason: &str| StoreError::Corrupt {
        offset: offset as u64,
        reason: reason.to_string(),
    };

    let header_end = offset + 4;
    if data.len() < header_end {
        return Err(corrupt("truncated length header"));
    }
    let len = u32::from_be_bytes(data[offset..header_end].try_into().unwrap()) as usize;

    let payload_end = header_end + len;
    if data.len() < payload_end + 4 {
        return Err(corrupt("truncated payload"));
    }
    let payload = &data[header_end..payload_end];
    let stored = u32::from_be_bytes(data[payload_end..payload_end + 4].try_into().unwrap());

    let mut hasher = Hasher::new();
    hasher.update(payload);
    if hasher.finalize() != stored {
        return Err(corrupt("checksum mismatch"));
    }

    let op: LogOp = bincode::deserialize(payload)?;
    Ok((op, payload_end + 4))
}

#[derive(Debug)]
struct LogWriter {
    file: File,
    path: PathBuf,
    offset: u64,
}

impl LogWriter {
    fn append(&mut self, frame: &[u8]) -> Result<(), StoreError> {
        self.file.write_all(frame)?;
        self.offset += frame.len() as u64;
        Ok(())
    }
}

#[derive(Debug)]
struct FileTable {
    records: RwLock<BTreeMap<String, Record>>,
    // Serializes all mutations so log order matches index order.
    log: Mutex<LogWriter>,
}

impl FileTable {
    fn open(path: PathBuf) -> Result<Self, StoreError> {
        let mut records = BTreeMap::new();
        let mut valid_len = 0u64;

        if path.exists() {
            let mut data = Vec::new();
            File::open(&path)?.read_to_end(&mut data)?;

            let mut offset = 0usize;
            while offset < data.len() {
                match decode_op(&data, offset) {
                    Ok((LogOp::Set(record), next)) => {
                        records.insert(record.key.clone(), record);
                        offset = next;
                    }
                    Ok((LogOp::Del(key), next)) => {
                        records.remove(&key);
                        offset = next;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "stopping log replay at corrupt tail");
                        break;
                    }
                }
            }
            valid_len = offset as u64;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        // Drop any torn tail so subsequent appends start on a frame boundary.
        if file.metadata()?.len() > valid_len {
            file.set_len(valid_len)?;
        }

        tracing::debug!(path = %path.display(), keys = records.len(), offset = valid_len, "opened table log");

        Ok(Self {
            records: RwLock::new(records),
            log: Mutex::new(LogWriter {
                file,
                path,
                offset: valid_len,
            }),
        })
    }

    fn apply(&self, op: LogOp, max_log_bytes: u64) -> Result<(), StoreError> {
        let frame = encode_op(&op)?;

        let mut log = self.log.lock();
        log.append(&frame)?;
        match op {
            LogOp::Set(record) => {
                self.records.write().insert(record.key.clone(), record);
            }
            LogOp::Del(key) => {
                self.records.write().remove(&key);
            }
        }

        if log.offset > max_log_bytes {
            self.compact(&mut log)?;
        }
        Ok(())
    }

    /// Rewrite the log from the live index, dropping deleted and expired
    /// records. Runs with the log lock held, so no mutation can interleave.
    fn compact(&self, log: &mut LogWriter) -> Result<(), StoreError> {
        let records = self.records.read();
        let tmp_path = log.path.with_extension("log.tmp");

        let mut tmp = File::create(&tmp_path)?;
        let mut offset = 0u64;
        for record in records.values() {
            if record.is_expired() {
                continue;
            }
            let frame = encode_op(&LogOp::Set(record.clone()))?;
            tmp.write_all(&frame)?;
            offset += frame.len() as u64;
        }
        tmp.sync_all()?;
        std::fs::rename(&tmp_path, &log.path)?;

        log.file = OpenOptions::new().append(true).open(&log.path)?;
        let before = log.offset;
        log.offset = offset;

        tracing::info!(path = %log.path.display(), before, after = offset, "compacted table log");
        Ok(())
    }
}

impl FileBackend {
    pub fn open(dir: impl AsRef<Path>, max_log_bytes: u64) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_log_bytes,
            tables: DashMap::new(),
        })
    }

    fn table(&self, name: &str) -> Result<Arc<FileTable>, StoreError> {
        if let Some(table) = self.tables.get(name) {
            return Ok(table.clone());
        }

        match self.tables.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(e) => Ok(e.get().clone()),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                let table = Arc::new(FileTable::open(self.dir.join(format!("{name}.log")))?);
                v.insert(table.clone());
                Ok(table)
            }
        }
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn write(&self, table: &str, record: Record) -> Result<(), StoreError> {
        self.table(table)?.apply(LogOp::Set(record), self.max_log_bytes)
    }

    async fn read(&self, table: &str, key: &str) -> Result<Option<Record>, StoreError> {
        let table = self.table(table)?;
        let records = table.records.read();
        Ok(records.get(key).cloned())
    }

    async fn read_prefix(&self, table: &str, prefix: &str) -> Result<Vec<Record>, StoreError> {
        let table = self.table(table)?;
        let records = table.records.read();
        Ok(prefix_range(&records, prefix).map(|(_, r)| r.clone()).collect())
    }

    async fn list(&self, table: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let table = self.table(table)?;
        let records = table.records.read();
        Ok(prefix_range(&records, prefix)
            .filter(|(_, r)| !r.is_expired())
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        self.table(table)?
            .apply(LogOp::Del(key.to_string()), self.max_log_bytes)
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

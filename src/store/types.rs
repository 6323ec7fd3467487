use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// A single stored record. Keys are unique within one table; the value is an
/// opaque byte sequence and may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: Vec<u8>,
    pub expires_at: Option<u64>, // Unix nanos, None = never expires
}

impl Record {
    pub fn new(key: String, value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|ttl| now_nanos() + ttl.as_nanos() as u64);

        Self {
            key,
            value,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expiry) => now_nanos() > expiry,
            None => false,
        }
    }
}

pub fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_nanos() as u64
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Converted to an absolute expiry at write time.
    pub ttl: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Match every key starting with the given key instead of the key alone.
    pub prefix: bool,
    /// Zero or unset means no cap.
    pub limit: Option<u64>,
    pub offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub prefix: Option<String>,
    /// Zero or unset means no cap.
    pub limit: Option<u64>,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub data_dir: String,
    pub default_table: String,
    pub reap_interval_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub max_log_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            data_dir: "data".to_string(),
            default_table: "default".to_string(),
            reap_interval_ms: 500,
            request_timeout_secs: Some(15),
            max_log_bytes: 128 * 1024 * 1024, // 128 MB
        }
    }
}

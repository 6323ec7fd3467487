pub mod backend;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod file;
pub mod memory;
pub mod metrics;
pub mod types;

pub use backend::Backend;
pub use engine::Store;
pub use error::StoreError;
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use types::{BackendKind, ListOptions, ReadOptions, Record, StoreConfig, WriteOptions};

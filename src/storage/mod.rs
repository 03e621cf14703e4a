//! Whole-blob key/value storage used to persist results.
//!
//! Backends only need get/set/remove of string payloads; the result store
//! owns the JSON layout inside the blob.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg_attr(test, mockall::automock)]
pub trait BlobStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

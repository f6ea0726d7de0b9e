//! Key-value storage backends underneath the graph store.
//!
//! This module defines the [`StorageBackend`] trait and provides implementations:
//! - [`RocksDBBackend`]: Production-ready persistent storage
//! - [`MemoryBackend`]: In-memory storage for testing
//!
//! Backends take `&self` for writes: many typed vertex wrappers borrow the same
//! graph at once, so synchronization lives inside the backend.

mod memory;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use memory::MemoryBackend;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDBBackend;

use crate::error::StoreResult;

/// Key-value pair for storage operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Trait defining the key-value backend interface.
///
/// All storage operations are explicit and return `Result` to handle failures.
/// Implementations must apply [`write_batch`](StorageBackend::write_batch) atomically.
pub trait StorageBackend: Send + Sync {
    /// Store a key-value pair.
    ///
    /// When `sync` is set the write reaches durable storage before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`](crate::StoreError::Backend) if the write fails.
    fn put(&self, key: &[u8], value: &[u8], sync: bool) -> StoreResult<()>;

    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Delete a key-value pair.
    ///
    /// Does not error if the key doesn't exist (idempotent).
    fn delete(&self, key: &[u8], sync: bool) -> StoreResult<()>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> StoreResult<bool>;

    /// Collect all key-value pairs with keys starting with the given prefix,
    /// in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>>;

    /// Collect all keys starting with the given prefix, in ascending order.
    fn scan_prefix_keys(&self, prefix: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        Ok(self
            .scan_prefix(prefix)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Execute a batch of write operations atomically.
    ///
    /// Either all operations succeed or none do.
    fn write_batch(&self, operations: Vec<BatchOperation>, sync: bool) -> StoreResult<()>;

    /// Flush any buffered writes to disk.
    ///
    /// This is explicit - no automatic flushing happens.
    fn flush(&self) -> StoreResult<()>;

    /// Backend-specific usage statistics, one `(name, value)` pair per metric.
    ///
    /// Backends that do not collect statistics return an empty list.
    fn statistics(&self) -> StoreResult<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}

/// Batch write operation for atomic updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair
    Put {
        /// Key to write
        key: Vec<u8>,
        /// Value to write
        value: Vec<u8>,
    },
    /// Delete a key
    Delete {
        /// Key to delete
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Shorthand for a [`BatchOperation::Put`].
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a [`BatchOperation::Delete`].
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

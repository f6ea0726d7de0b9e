//! RocksDB storage backend for production use.
//!
//! This backend provides crash-safe, persistent storage with write-ahead logging.
//! Writes flagged `sync` are fsync'ed before returning.

use super::{BatchOperation, KeyValue, StorageBackend};
use crate::error::{StoreError, StoreResult};
use crate::store::StoreConfig;
use log::{info, warn};
use rocksdb::{Options, WriteBatch, WriteOptions, DB};
use std::path::Path;
use std::sync::Arc;

/// RocksDB-backed persistent storage.
///
/// This is the production storage backend. It provides:
/// - Crash-safe writes with WAL
/// - Atomic batch operations
/// - Efficient prefix scans
/// - Optional usage statistics
#[derive(Clone)]
pub struct RocksDBBackend {
    db: Arc<DB>,
    options: Arc<Options>,
    statistics: bool,
}

impl RocksDBBackend {
    /// Open or create a RocksDB database at the given path with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with_config(path, &StoreConfig::default())
    }

    /// Open a RocksDB database configured from a [`StoreConfig`].
    ///
    /// Read-only configurations open the database with
    /// `DB::open_for_read_only`; the database must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database cannot be opened.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: &StoreConfig) -> StoreResult<Self> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing && !config.read_only);
        opts.set_max_open_files(config.max_open_files);
        if config.statistics {
            opts.enable_statistics();
        }

        let db = if config.read_only {
            warn!("Opening RocksDB at {path:?} in read-only mode");
            DB::open_for_read_only(&opts, path, false)
        } else {
            info!("Opening RocksDB at {path:?}");
            DB::open(&opts, path)
        }
        .map_err(|e| StoreError::backend(format!("Failed to open RocksDB at {path:?}"), Some(e)))?;

        Ok(Self {
            db: Arc::new(db),
            options: Arc::new(opts),
            statistics: config.statistics,
        })
    }

    /// Get the underlying RocksDB database handle.
    ///
    /// Useful for advanced operations not exposed by the storage trait.
    pub fn db(&self) -> &Arc<DB> {
        &self.db
    }

    fn write_options(sync: bool) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(sync);
        opts
    }
}

impl StorageBackend for RocksDBBackend {
    fn put(&self, key: &[u8], value: &[u8], sync: bool) -> StoreResult<()> {
        self.db
            .put_opt(key, value, &Self::write_options(sync))
            .map_err(|e| StoreError::backend("Failed to put key-value pair", Some(e)))
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(|e| StoreError::backend("Failed to get value", Some(e)))
    }

    fn delete(&self, key: &[u8], sync: bool) -> StoreResult<()> {
        self.db
            .delete_opt(key, &Self::write_options(sync))
            .map_err(|e| StoreError::backend("Failed to delete key", Some(e)))
    }

    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        self.db
            .get_pinned(key)
            .map(|opt| opt.is_some())
            .map_err(|e| StoreError::backend("Failed to check key existence", Some(e)))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>> {
        let mut results = Vec::new();
        let iter = self.db.prefix_iterator(prefix);

        for item in iter {
            let (key, value) = item
                .map_err(|e| StoreError::backend("Failed to iterate over prefix", Some(e)))?;

            // No prefix extractor is configured, so the iterator runs in total
            // order past the end of the prefix
            if !key.starts_with(prefix) {
                break;
            }

            results.push((key.to_vec(), value.to_vec()));
        }

        Ok(results)
    }

    fn write_batch(&self, operations: Vec<BatchOperation>, sync: bool) -> StoreResult<()> {
        let mut batch = WriteBatch::default();

        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    batch.put(&key, &value);
                }
                BatchOperation::Delete { key } => {
                    batch.delete(&key);
                }
            }
        }

        self.db
            .write_opt(batch, &Self::write_options(sync))
            .map_err(|e| StoreError::backend("Failed to write batch", Some(e)))
    }

    fn flush(&self) -> StoreResult<()> {
        self.db
            .flush()
            .map_err(|e| StoreError::backend("Failed to flush database", Some(e)))
    }

    fn statistics(&self) -> StoreResult<Vec<(String, String)>> {
        if !self.statistics {
            return Ok(Vec::new());
        }
        let dump = self.options.get_statistics().unwrap_or_default();
        Ok(parse_statistics(&dump))
    }
}

/// Split a RocksDB statistics dump into `(metric, value)` pairs.
///
/// Lines look like `rocksdb.block.cache.miss COUNT : 0`.
fn parse_statistics(dump: &str) -> Vec<(String, String)> {
    dump.lines()
        .filter_map(|line| {
            let (name, value) = line.trim().split_once(' ')?;
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

//! In-memory storage backend for testing.
//!
//! **Note**: This backend is for testing only. Do not use in production.
//! All data is lost when the backend is dropped.

use super::{BatchOperation, KeyValue, StorageBackend};
use crate::error::StoreResult;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory storage backend using a BTreeMap.
///
/// Keys are kept ordered so that prefix scans return them in the same order
/// as the RocksDB backend does. Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Get the number of key-value pairs stored.
    ///
    /// Useful for testing and assertions.
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Check if the backend is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().unwrap().is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn put(&self, key: &[u8], value: &[u8], _sync: bool) -> StoreResult<()> {
        self.data
            .write()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.data.read().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &[u8], _sync: bool) -> StoreResult<()> {
        self.data.write().unwrap().remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.data.read().unwrap().contains_key(key))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>> {
        let data = self.data.read().unwrap();
        let results: Vec<KeyValue> = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn write_batch(&self, operations: Vec<BatchOperation>, _sync: bool) -> StoreResult<()> {
        let mut data = self.data.write().unwrap();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        // No-op for in-memory backend
        Ok(())
    }

    fn statistics(&self) -> StoreResult<Vec<(String, String)>> {
        Ok(vec![("memory.keys".to_string(), self.len().to_string())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_backend_is_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());
        assert_eq!(backend.len(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let backend = MemoryBackend::new();
        backend.put(b"key1", b"value1", false).unwrap();

        let value = backend.get(b"key1").unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));
    }

    #[test]
    fn test_delete_nonexistent_key() {
        let backend = MemoryBackend::new();
        // Should not error
        backend.delete(b"missing", true).unwrap();
    }

    #[test]
    fn test_scan_prefix_is_ordered() {
        let backend = MemoryBackend::new();
        backend.put(b"N\x02", b"", false).unwrap();
        backend.put(b"N\x01", b"", false).unwrap();
        backend.put(b"E\x01", b"", false).unwrap();

        let keys = backend.scan_prefix_keys(b"N").unwrap();
        assert_eq!(keys, vec![b"N\x01".to_vec(), b"N\x02".to_vec()]);
    }

    #[test]
    fn test_write_batch_mixed_operations() {
        let backend = MemoryBackend::new();
        backend.put(b"key1", b"value1", false).unwrap();
        backend.put(b"key2", b"value2", false).unwrap();

        let ops = vec![
            BatchOperation::delete(b"key1".to_vec()),
            BatchOperation::put(b"key3".to_vec(), b"value3".to_vec()),
        ];

        backend.write_batch(ops, true).unwrap();
        assert_eq!(backend.len(), 2);
        assert!(backend.get(b"key1").unwrap().is_none());
        assert_eq!(backend.get(b"key3").unwrap(), Some(b"value3".to_vec()));
    }

    #[test]
    fn test_clones_share_data() {
        let backend = MemoryBackend::new();
        let other = backend.clone();
        backend.put(b"key1", b"value1", false).unwrap();
        assert!(other.exists(b"key1").unwrap());
    }

    #[test]
    fn test_statistics_reports_key_count() {
        let backend = MemoryBackend::new();
        backend.put(b"key1", b"value1", false).unwrap();
        let stats = backend.statistics().unwrap();
        assert_eq!(stats, vec![("memory.keys".to_string(), "1".to_string())]);
    }
}

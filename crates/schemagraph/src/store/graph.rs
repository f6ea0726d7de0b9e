//! Reference [`GraphStore`] over a key-value [`StorageBackend`].

use super::keys::{self, EDGE_PREFIX, VERTEX_PREFIX};
use super::{GraphStore, LocalId, Statistics, StoreConfig, TypeTag, VertexId, WriteOptions};
use crate::error::{StoreError, StoreResult};
use crate::storage::{BatchOperation, MemoryBackend, StorageBackend};
use log::{debug, trace};

/// Undirected graph of typed vertices persisted in a key-value backend.
///
/// Every edge is stored twice, once per direction, in the same atomic batch,
/// so neighbor lookups from either end are a single prefix scan.
pub struct Graph {
    storage: Box<dyn StorageBackend>,
    config: StoreConfig,
}

impl Graph {
    /// Create a graph on top of an explicit backend.
    pub fn with_backend(storage: Box<dyn StorageBackend>, config: StoreConfig) -> Self {
        Self { storage, config }
    }

    /// Open a persistent graph at the given path.
    ///
    /// The configuration is read from `<path>/config.json` when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the configuration or the database
    /// cannot be read.
    #[cfg(feature = "rocksdb-backend")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> StoreResult<Self> {
        let config = StoreConfig::from_db_path(&path)?;
        Self::open_with_config(path, config)
    }

    /// Open a persistent graph with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database cannot be opened.
    #[cfg(feature = "rocksdb-backend")]
    pub fn open_with_config<P: AsRef<std::path::Path>>(
        path: P,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        let backend = crate::storage::RocksDBBackend::open_with_config(path, &config)?;
        Ok(Self::with_backend(Box::new(backend), config))
    }

    /// Create an in-memory graph for testing.
    ///
    /// **Warning**: All data is lost when the graph is dropped.
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()), StoreConfig::default())
    }

    /// Configuration the graph was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn ensure_writable(&self, operation: &str) -> StoreResult<()> {
        if self.config.read_only {
            return Err(StoreError::ReadOnly {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn sync(&self, opts: WriteOptions) -> bool {
        opts.commit || self.config.sync_writes
    }

    fn require_vertex(&self, vertex: VertexId) -> StoreResult<()> {
        if !self.contains_vertex(vertex)? {
            return Err(StoreError::MissingVertex { vertex });
        }
        Ok(())
    }

    /// Queue deletion of every edge of `vertex` (both directions).
    fn push_edge_removals(
        &self,
        vertex: VertexId,
        filter: Option<TypeTag>,
        batch: &mut Vec<BatchOperation>,
    ) -> StoreResult<usize> {
        let mut removed = 0;
        for key in self.storage.scan_prefix_keys(&keys::edge_prefix(vertex, filter))? {
            if let Some((lhs, rhs)) = keys::decode_edge_key(&key) {
                batch.push(BatchOperation::delete(keys::edge_key(rhs, lhs)));
                batch.push(BatchOperation::Delete { key });
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl GraphStore for Graph {
    fn insert_vertex(
        &self,
        vertex: VertexId,
        payload: Option<&[u8]>,
        opts: WriteOptions,
    ) -> StoreResult<()> {
        debug!(
            "insert_vertex(vertex={vertex}, data_size={}, commit={})",
            payload.map_or(0, <[u8]>::len),
            opts.commit
        );
        self.ensure_writable("insert vertex")?;
        self.storage.put(
            &keys::vertex_key(vertex),
            &keys::encode_value(payload),
            self.sync(opts),
        )
    }

    fn insert_vertices(
        &self,
        tag: TypeTag,
        ids: &[LocalId],
        payloads: Option<&[Vec<u8>]>,
        opts: WriteOptions,
    ) -> StoreResult<()> {
        debug!(
            "insert_vertices(type={tag}, count={}, payloads={}, commit={})",
            ids.len(),
            payloads.is_some(),
            opts.commit
        );
        self.ensure_writable("insert vertices")?;
        if let Some(payloads) = payloads {
            if payloads.len() != ids.len() {
                return Err(StoreError::InvalidArgument {
                    message: format!(
                        "{} payloads given for {} vertices",
                        payloads.len(),
                        ids.len()
                    ),
                });
            }
        }

        let batch = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let value = keys::encode_value(payloads.map(|p| p[i].as_slice()));
                BatchOperation::put(keys::vertex_key(VertexId { tag, id: *id }), value)
            })
            .collect();
        self.storage.write_batch(batch, self.sync(opts))?;
        trace!("Batch of {} vertices added successfully", ids.len());
        Ok(())
    }

    fn get_vertex(&self, vertex: VertexId) -> StoreResult<Option<Vec<u8>>> {
        trace!("get_vertex(vertex={vertex})");
        Ok(self
            .storage
            .get(&keys::vertex_key(vertex))?
            .and_then(|value| keys::decode_value(&value)))
    }

    fn contains_vertex(&self, vertex: VertexId) -> StoreResult<bool> {
        self.storage.exists(&keys::vertex_key(vertex))
    }

    fn discard_vertex(&self, vertex: VertexId, opts: WriteOptions) -> StoreResult<()> {
        debug!("discard_vertex(vertex={vertex}, commit={})", opts.commit);
        self.ensure_writable("discard vertex")?;
        let mut batch = vec![BatchOperation::delete(keys::vertex_key(vertex))];
        let removed = self.push_edge_removals(vertex, None, &mut batch)?;
        self.storage.write_batch(batch, self.sync(opts))?;
        trace!("Vertex {vertex} discarded along with {removed} edges");
        Ok(())
    }

    fn count_vertices(&self) -> StoreResult<usize> {
        Ok(self.storage.scan_prefix_keys(&[VERTEX_PREFIX])?.len())
    }

    fn count_vertices_of(&self, tag: TypeTag) -> StoreResult<usize> {
        Ok(self
            .storage
            .scan_prefix_keys(&keys::vertex_type_prefix(tag))?
            .len())
    }

    fn vertices(&self) -> StoreResult<Vec<VertexId>> {
        Ok(self
            .storage
            .scan_prefix_keys(&[VERTEX_PREFIX])?
            .iter()
            .filter_map(|key| keys::decode_vertex_key(key))
            .collect())
    }

    fn vertices_of(&self, tag: TypeTag) -> StoreResult<Vec<VertexId>> {
        Ok(self
            .storage
            .scan_prefix_keys(&keys::vertex_type_prefix(tag))?
            .iter()
            .filter_map(|key| keys::decode_vertex_key(key))
            .collect())
    }

    fn insert_edge(
        &self,
        lhs: VertexId,
        rhs: VertexId,
        payload: Option<&[u8]>,
        opts: WriteOptions,
    ) -> StoreResult<()> {
        debug!(
            "insert_edge(vertex1={lhs}, vertex2={rhs}, payload={}, commit={})",
            payload.is_some(),
            opts.commit
        );
        self.ensure_writable("insert edge")?;
        if lhs == rhs {
            return Err(StoreError::InvalidEdge { lhs, rhs });
        }
        self.require_vertex(lhs)?;
        self.require_vertex(rhs)?;

        let value = keys::encode_value(payload);
        let batch = vec![
            BatchOperation::put(keys::edge_key(lhs, rhs), value.clone()),
            BatchOperation::put(keys::edge_key(rhs, lhs), value),
        ];
        self.storage.write_batch(batch, self.sync(opts))
    }

    fn insert_edges(
        &self,
        vertex: VertexId,
        tag: TypeTag,
        ids: &[LocalId],
        create_vertices: bool,
        opts: WriteOptions,
    ) -> StoreResult<()> {
        debug!(
            "insert_edges(vertex={vertex}, type={tag}, count={}, create_vertices={create_vertices}, commit={})",
            ids.len(),
            opts.commit
        );
        self.ensure_writable("insert edges")?;
        if ids.is_empty() {
            return Ok(());
        }

        let mut batch = Vec::with_capacity(2 * ids.len() + 1);
        let targets: Vec<VertexId> = ids.iter().map(|id| VertexId { tag, id: *id }).collect();
        if let Some(target) = targets.iter().find(|target| **target == vertex) {
            return Err(StoreError::InvalidEdge {
                lhs: vertex,
                rhs: *target,
            });
        }

        for endpoint in std::iter::once(&vertex).chain(targets.iter()) {
            if self.contains_vertex(*endpoint)? {
                continue;
            }
            if !create_vertices {
                return Err(StoreError::MissingVertex { vertex: *endpoint });
            }
            batch.push(BatchOperation::put(
                keys::vertex_key(*endpoint),
                keys::encode_value(None),
            ));
        }
        for target in targets {
            batch.push(BatchOperation::put(
                keys::edge_key(vertex, target),
                keys::encode_value(None),
            ));
            batch.push(BatchOperation::put(
                keys::edge_key(target, vertex),
                keys::encode_value(None),
            ));
        }
        self.storage.write_batch(batch, self.sync(opts))
    }

    fn get_edge(&self, lhs: VertexId, rhs: VertexId) -> StoreResult<Option<Vec<u8>>> {
        trace!("get_edge(vertex1={lhs}, vertex2={rhs})");
        Ok(self
            .storage
            .get(&keys::edge_key(lhs, rhs))?
            .and_then(|value| keys::decode_value(&value)))
    }

    fn contains_edge(&self, lhs: VertexId, rhs: VertexId) -> StoreResult<bool> {
        self.storage.exists(&keys::edge_key(lhs, rhs))
    }

    fn neighbors(&self, vertex: VertexId, filter: Option<TypeTag>) -> StoreResult<Vec<VertexId>> {
        trace!("neighbors(vertex={vertex}, filter={filter:?})");
        Ok(self
            .storage
            .scan_prefix_keys(&keys::edge_prefix(vertex, filter))?
            .iter()
            .filter_map(|key| keys::decode_edge_key(key))
            .map(|(_, rhs)| rhs)
            .collect())
    }

    fn discard_edge(&self, lhs: VertexId, rhs: VertexId, opts: WriteOptions) -> StoreResult<()> {
        debug!(
            "discard_edge(vertex1={lhs}, vertex2={rhs}, commit={})",
            opts.commit
        );
        self.ensure_writable("discard edge")?;
        let batch = vec![
            BatchOperation::delete(keys::edge_key(lhs, rhs)),
            BatchOperation::delete(keys::edge_key(rhs, lhs)),
        ];
        self.storage.write_batch(batch, self.sync(opts))
    }

    fn discard_edges(
        &self,
        vertex: VertexId,
        filter: Option<TypeTag>,
        opts: WriteOptions,
    ) -> StoreResult<usize> {
        debug!(
            "discard_edges(vertex={vertex}, filter={filter:?}, commit={})",
            opts.commit
        );
        self.ensure_writable("discard edges")?;
        let mut batch = Vec::new();
        let removed = self.push_edge_removals(vertex, filter, &mut batch)?;
        if removed > 0 {
            self.storage.write_batch(batch, self.sync(opts))?;
        }
        Ok(removed)
    }

    fn count_edges(&self) -> StoreResult<usize> {
        Ok(self.storage.scan_prefix_keys(&[EDGE_PREFIX])?.len() / 2)
    }

    fn edges(&self) -> StoreResult<Vec<(VertexId, VertexId)>> {
        Ok(self
            .storage
            .scan_prefix_keys(&[EDGE_PREFIX])?
            .iter()
            .filter_map(|key| keys::decode_edge_key(key))
            .collect())
    }

    fn clear(&self, opts: WriteOptions) -> StoreResult<()> {
        debug!("clear(commit={})", opts.commit);
        self.ensure_writable("clear")?;
        let mut batch = Vec::new();
        for prefix in [VERTEX_PREFIX, EDGE_PREFIX] {
            batch.extend(
                self.storage
                    .scan_prefix_keys(&[prefix])?
                    .into_iter()
                    .map(|key| BatchOperation::Delete { key }),
            );
        }
        self.storage.write_batch(batch, self.sync(opts))
    }

    fn commit(&self) -> StoreResult<()> {
        debug!("commit()");
        self.storage.flush()
    }

    fn statistics(&self) -> StoreResult<Statistics> {
        let mut stats = Statistics::new();
        stats.insert("vertices", self.count_vertices()?);
        stats.insert("edges", self.count_edges()?);
        if self.config.statistics {
            for (name, value) in self.storage.statistics()? {
                stats.insert(name, value);
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::make_id;

    #[test]
    fn test_vertex_without_payload_reads_none() {
        let graph = Graph::in_memory();
        let vertex = make_id(0, 1);
        graph
            .insert_vertex(vertex, None, WriteOptions::default())
            .unwrap();
        assert!(graph.contains_vertex(vertex).unwrap());
        assert_eq!(graph.get_vertex(vertex).unwrap(), None);
        assert_eq!(graph.get_vertex(make_id(0, 2)).unwrap(), None);
    }

    #[test]
    fn test_empty_payload_reads_back_empty() {
        let graph = Graph::in_memory();
        let (a, b) = (make_id(0, 1), make_id(0, 2));
        graph
            .insert_vertex(a, Some(&[]), WriteOptions::default())
            .unwrap();
        graph
            .insert_vertices(0, &[2], Some(&[Vec::new()]), WriteOptions::default())
            .unwrap();
        graph
            .insert_edge(a, b, Some(&[]), WriteOptions::default())
            .unwrap();

        assert_eq!(graph.get_vertex(a).unwrap(), Some(vec![]));
        assert_eq!(graph.get_vertex(b).unwrap(), Some(vec![]));
        assert_eq!(graph.get_edge(b, a).unwrap(), Some(vec![]));

        graph.insert_edge(a, b, None, WriteOptions::default()).unwrap();
        assert_eq!(graph.get_edge(a, b).unwrap(), None);
    }

    #[test]
    fn test_vertex_payload_overwrite() {
        let graph = Graph::in_memory();
        let vertex = make_id(3, 9);
        graph
            .insert_vertex(vertex, Some(b"one".as_slice()), WriteOptions::default())
            .unwrap();
        graph
            .insert_vertex(vertex, Some(b"two".as_slice()), WriteOptions::commit())
            .unwrap();
        assert_eq!(graph.get_vertex(vertex).unwrap(), Some(b"two".to_vec()));
        assert_eq!(graph.count_vertices().unwrap(), 1);
    }

    #[test]
    fn test_bulk_insert_rejects_mismatched_payloads() {
        let graph = Graph::in_memory();
        let err = graph
            .insert_vertices(1, &[1, 2, 3], Some(&[vec![1]]), WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument { .. }));
        assert_eq!(graph.count_vertices().unwrap(), 0);
    }

    #[test]
    fn test_edge_requires_both_vertices() {
        let graph = Graph::in_memory();
        let (v1, v2) = (make_id(0, 1), make_id(0, 2));
        graph.insert_vertex(v1, None, WriteOptions::default()).unwrap();

        let err = graph
            .insert_edge(v1, v2, None, WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingVertex { vertex } if vertex == v2));
        assert_eq!(graph.count_edges().unwrap(), 0);
    }

    #[test]
    fn test_edge_to_self_is_invalid() {
        let graph = Graph::in_memory();
        let v1 = make_id(0, 1);
        graph.insert_vertex(v1, None, WriteOptions::default()).unwrap();
        let err = graph
            .insert_edge(v1, v1, None, WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidEdge { .. }));
    }

    #[test]
    fn test_edge_is_undirected() {
        let graph = Graph::in_memory();
        let (v1, v2) = (make_id(0, 1), make_id(1, 2));
        graph.insert_vertex(v1, None, WriteOptions::default()).unwrap();
        graph.insert_vertex(v2, None, WriteOptions::default()).unwrap();
        graph
            .insert_edge(v1, v2, Some(b"payload".as_slice()), WriteOptions::default())
            .unwrap();

        assert!(graph.contains_edge(v1, v2).unwrap());
        assert!(graph.contains_edge(v2, v1).unwrap());
        assert_eq!(graph.get_edge(v2, v1).unwrap(), Some(b"payload".to_vec()));
        assert_eq!(graph.count_edges().unwrap(), 1);
        assert_eq!(graph.edges().unwrap(), vec![(v1, v2), (v2, v1)]);

        graph.discard_edge(v2, v1, WriteOptions::default()).unwrap();
        assert!(!graph.contains_edge(v1, v2).unwrap());
        assert_eq!(graph.get_edge(v1, v2).unwrap(), None);
    }

    #[test]
    fn test_neighbors_filtered_by_type() {
        let graph = Graph::in_memory();
        let center = make_id(0, 0);
        let others = [make_id(1, 5), make_id(2, 1), make_id(1, 3)];
        graph.insert_vertex(center, None, WriteOptions::default()).unwrap();
        for other in others {
            graph.insert_vertex(other, None, WriteOptions::default()).unwrap();
            graph
                .insert_edge(center, other, None, WriteOptions::default())
                .unwrap();
        }

        assert_eq!(
            graph.neighbors(center, None).unwrap(),
            vec![make_id(1, 3), make_id(1, 5), make_id(2, 1)]
        );
        assert_eq!(
            graph.neighbors(center, Some(1)).unwrap(),
            vec![make_id(1, 3), make_id(1, 5)]
        );
        assert_eq!(graph.neighbors(center, Some(7)).unwrap(), vec![]);
    }

    #[test]
    fn test_insert_edges_creates_vertices() {
        let graph = Graph::in_memory();
        let center = make_id(0, 0);
        graph
            .insert_edges(center, 1, &[1, 2, 3], true, WriteOptions::default())
            .unwrap();
        assert_eq!(graph.count_vertices().unwrap(), 4);
        assert_eq!(graph.count_vertices_of(1).unwrap(), 3);
        assert_eq!(graph.neighbors(make_id(1, 2), None).unwrap(), vec![center]);
    }

    #[test]
    fn test_insert_edges_checks_vertices() {
        let graph = Graph::in_memory();
        let center = make_id(0, 0);
        graph.insert_vertex(center, None, WriteOptions::default()).unwrap();
        graph
            .insert_vertex(make_id(1, 1), None, WriteOptions::default())
            .unwrap();
        let err = graph
            .insert_edges(center, 1, &[1, 2], false, WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingVertex { vertex } if vertex == make_id(1, 2)));
        assert_eq!(graph.count_edges().unwrap(), 0);
    }

    #[test]
    fn test_insert_edges_keeps_existing_payloads() {
        let graph = Graph::in_memory();
        let center = make_id(0, 0);
        graph
            .insert_vertex(center, Some(b"keep".as_slice()), WriteOptions::default())
            .unwrap();
        graph
            .insert_edges(center, 1, &[1], true, WriteOptions::default())
            .unwrap();
        assert_eq!(graph.get_vertex(center).unwrap(), Some(b"keep".to_vec()));
    }

    #[test]
    fn test_discard_edges_with_filter() {
        let graph = Graph::in_memory();
        let center = make_id(0, 0);
        graph
            .insert_edges(center, 1, &[1, 2], true, WriteOptions::default())
            .unwrap();
        graph
            .insert_edges(center, 2, &[1], true, WriteOptions::default())
            .unwrap();

        let removed = graph
            .discard_edges(center, Some(1), WriteOptions::default())
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(graph.neighbors(center, None).unwrap(), vec![make_id(2, 1)]);
        assert_eq!(graph.neighbors(make_id(1, 1), None).unwrap(), vec![]);
    }

    #[test]
    fn test_discard_vertex_cascades_to_edges() {
        let graph = Graph::in_memory();
        let (a, b, c, d) = (make_id(0, 1), make_id(0, 2), make_id(0, 3), make_id(0, 4));
        for vertex in [a, b, c, d] {
            graph.insert_vertex(vertex, None, WriteOptions::default()).unwrap();
        }
        for (lhs, rhs) in [(a, b), (b, c), (c, d), (d, a)] {
            graph.insert_edge(lhs, rhs, None, WriteOptions::default()).unwrap();
        }

        graph.discard_vertex(a, WriteOptions::default()).unwrap();
        assert!(!graph.contains_vertex(a).unwrap());
        assert_eq!(graph.neighbors(a, None).unwrap(), vec![]);
        assert_eq!(graph.neighbors(b, None).unwrap(), vec![c]);
        assert_eq!(graph.neighbors(c, None).unwrap(), vec![b, d]);
        assert_eq!(graph.neighbors(d, None).unwrap(), vec![c]);
    }

    #[test]
    fn test_discard_vertex_is_idempotent() {
        let graph = Graph::in_memory();
        let vertex = make_id(0, 1);
        graph.insert_vertex(vertex, None, WriteOptions::default()).unwrap();
        graph.discard_vertex(vertex, WriteOptions::default()).unwrap();
        graph.discard_vertex(vertex, WriteOptions::default()).unwrap();
        assert!(!graph.contains_vertex(vertex).unwrap());
    }

    #[test]
    fn test_clear() {
        let graph = Graph::in_memory();
        graph
            .insert_edges(make_id(0, 0), 1, &[1, 2], true, WriteOptions::default())
            .unwrap();
        graph.clear(WriteOptions::default()).unwrap();
        assert_eq!(graph.count_vertices().unwrap(), 0);
        assert_eq!(graph.count_edges().unwrap(), 0);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let graph = Graph::with_backend(
            Box::new(MemoryBackend::new()),
            StoreConfig::default().with_read_only(true),
        );
        let err = graph
            .insert_vertex(make_id(0, 1), None, WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly { .. }));
        assert!(!graph.contains_vertex(make_id(0, 1)).unwrap());
    }

    #[test]
    fn test_statistics() {
        let graph = Graph::in_memory();
        graph
            .insert_edges(make_id(0, 0), 1, &[1, 2], true, WriteOptions::default())
            .unwrap();
        let stats = graph.statistics().unwrap();
        assert_eq!(stats.get("vertices"), Some("3"));
        assert_eq!(stats.get("edges"), Some("2"));
        assert_eq!(stats.get("memory.keys"), Some("7"));
    }
}

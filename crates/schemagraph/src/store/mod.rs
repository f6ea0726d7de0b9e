//! Low-level graph store: composite vertex keys, vertex/edge CRUD and
//! neighbor queries.
//!
//! The typed layer only talks to the [`GraphStore`] trait. [`Graph`] is the
//! reference implementation, laid over any [`StorageBackend`](crate::storage::StorageBackend).
//!
//! Edges are undirected: `(a, b)` and `(b, a)` name the same edge and carry
//! the same payload.

mod config;
mod graph;
mod keys;

pub use config::StoreConfig;
pub use graph::Graph;

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Vertex type tag.
pub type TypeTag = i32;

/// Identifier of a vertex, unique within its type.
pub type LocalId = u64;

/// Global vertex identity: type tag plus per-type identifier.
///
/// Ordering follows `(tag, id)`, which is also the byte order of the
/// encoded store keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId {
    /// Vertex type tag
    pub tag: TypeTag,
    /// Identifier within the type
    pub id: LocalId,
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.tag, self.id)
    }
}

impl From<(TypeTag, LocalId)> for VertexId {
    fn from((tag, id): (TypeTag, LocalId)) -> Self {
        make_id(tag, id)
    }
}

/// Build a vertex key from its type tag and local identifier.
pub const fn make_id(tag: TypeTag, id: LocalId) -> VertexId {
    VertexId { tag, id }
}

/// Per-call write settings forwarded to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Flush the write to durable storage before returning
    pub commit: bool,
}

impl WriteOptions {
    /// Options requesting a synced write.
    pub fn commit() -> Self {
        Self { commit: true }
    }
}

/// Store usage metrics, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    entries: BTreeMap<String, String>,
}

impl Statistics {
    /// Create an empty statistics map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a metric.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.entries.insert(name.into(), value.to_string());
    }

    /// Get a metric value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Number of metrics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no metric was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name} {value}")?;
        }
        Ok(())
    }
}

/// Contract of the low-level graph store used by the typed layer.
///
/// Every method takes `&self`: the typed layer hands out many short-lived
/// vertex wrappers that borrow the same store concurrently. Payloads are raw
/// bytes. A record written without payload reads back as `None`, one written
/// with an empty payload reads back as `Some` of no bytes.
pub trait GraphStore: Send + Sync {
    /// Insert or overwrite a vertex, optionally with a payload.
    fn insert_vertex(
        &self,
        vertex: VertexId,
        payload: Option<&[u8]>,
        opts: WriteOptions,
    ) -> StoreResult<()>;

    /// Insert many vertices of one type in a single atomic write.
    ///
    /// `payloads`, when given, must have the same length as `ids`.
    fn insert_vertices(
        &self,
        tag: TypeTag,
        ids: &[LocalId],
        payloads: Option<&[Vec<u8>]>,
        opts: WriteOptions,
    ) -> StoreResult<()>;

    /// Payload of a vertex, `None` if the vertex is absent or has no payload.
    fn get_vertex(&self, vertex: VertexId) -> StoreResult<Option<Vec<u8>>>;

    /// Whether the vertex exists.
    fn contains_vertex(&self, vertex: VertexId) -> StoreResult<bool>;

    /// Remove a vertex and all its edges. Absent vertices are ignored.
    fn discard_vertex(&self, vertex: VertexId, opts: WriteOptions) -> StoreResult<()>;

    /// Total number of vertices.
    fn count_vertices(&self) -> StoreResult<usize>;

    /// Number of vertices of one type.
    fn count_vertices_of(&self, tag: TypeTag) -> StoreResult<usize>;

    /// All vertices, in key order.
    fn vertices(&self) -> StoreResult<Vec<VertexId>>;

    /// Vertices of one type, in key order.
    ///
    /// The default implementation filters [`vertices`](GraphStore::vertices).
    fn vertices_of(&self, tag: TypeTag) -> StoreResult<Vec<VertexId>> {
        Ok(self
            .vertices()?
            .into_iter()
            .filter(|vertex| vertex.tag == tag)
            .collect())
    }

    /// Connect two existing vertices, optionally with a payload.
    fn insert_edge(
        &self,
        lhs: VertexId,
        rhs: VertexId,
        payload: Option<&[u8]>,
        opts: WriteOptions,
    ) -> StoreResult<()>;

    /// Connect one vertex to many vertices of one type in a single write.
    ///
    /// With `create_vertices` the endpoints are inserted (without payload)
    /// instead of being checked for existence.
    fn insert_edges(
        &self,
        vertex: VertexId,
        tag: TypeTag,
        ids: &[LocalId],
        create_vertices: bool,
        opts: WriteOptions,
    ) -> StoreResult<()>;

    /// Payload of an edge, `None` if the edge is absent or has no payload.
    fn get_edge(&self, lhs: VertexId, rhs: VertexId) -> StoreResult<Option<Vec<u8>>>;

    /// Whether the two vertices are connected.
    fn contains_edge(&self, lhs: VertexId, rhs: VertexId) -> StoreResult<bool>;

    /// Vertices connected to `vertex`, optionally only those of type `filter`,
    /// in key order.
    fn neighbors(&self, vertex: VertexId, filter: Option<TypeTag>) -> StoreResult<Vec<VertexId>>;

    /// Remove the edge between two vertices, in both directions.
    fn discard_edge(&self, lhs: VertexId, rhs: VertexId, opts: WriteOptions) -> StoreResult<()>;

    /// Remove the edges of `vertex`, optionally only toward type `filter`.
    ///
    /// Returns the number of removed edges.
    fn discard_edges(
        &self,
        vertex: VertexId,
        filter: Option<TypeTag>,
        opts: WriteOptions,
    ) -> StoreResult<usize>;

    /// Number of edges (each undirected edge counted once).
    fn count_edges(&self) -> StoreResult<usize>;

    /// All edges, each undirected edge listed in both directions.
    fn edges(&self) -> StoreResult<Vec<(VertexId, VertexId)>>;

    /// Remove every vertex and edge.
    fn clear(&self, opts: WriteOptions) -> StoreResult<()>;

    /// Flush pending writes to durable storage.
    fn commit(&self) -> StoreResult<()>;

    /// Usage metrics.
    fn statistics(&self) -> StoreResult<Statistics>;
}

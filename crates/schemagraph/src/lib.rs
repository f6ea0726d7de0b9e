//! # schemagraph
//!
//! A typed property-graph schema layer over a persistent, composite-key graph store.
//!
//! ## Core Principles
//!
//! - **Declare Once**: Vertex types, edge types and payload codecs are validated
//!   when declared and frozen into an immutable [`Schema`]
//! - **One Wrapper**: Every vertex type is served by the same [`TypedVertex`],
//!   parameterized at runtime by a descriptor
//! - **Fail Before Writing**: Codec and adjacency errors are raised before the
//!   store is touched
//! - **Store Errors Untouched**: Whatever the store reports reaches the caller as is
//! - **Persistence Primary**: Durable storage with RocksDB
//!
//! ## Architecture
//!
//! ```text
//! Application code (importers, analysis)
//!     ↓
//! SchemaGraph / TypedVertexCollection / TypedVertex
//!     ↓
//! Schema (registry, codec dispatcher)
//!     ↓
//! GraphStore (vertices keyed by (tag, id), undirected edges)
//!     ↓
//! Storage Backend (RocksDB, memory)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use schemagraph::{
//!     EdgeTypeDecl, Payload, SchemaGraph, SchemaRegistry, Serialization, VertexTypeDecl,
//! };
//! use std::sync::Arc;
//!
//! const PERSON: i32 = 1;
//! const SKILL: i32 = 2;
//!
//! # fn main() -> schemagraph::Result<()> {
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register_vertex_type(VertexTypeDecl::new("person", PERSON, Serialization::Generic))?
//!     .register_vertex_type(VertexTypeDecl::new("skill", SKILL, Serialization::Generic))?
//!     .register_edge_type(EdgeTypeDecl::new(PERSON, SKILL))?;
//! let schema = Arc::new(registry.finalize()?);
//!
//! let graph = SchemaGraph::in_memory(schema);
//! let persons = graph.vertices_of(PERSON)?;
//! let alice = persons.add(0, Payload::from("Alice"))?;
//! graph.vertices_of(SKILL)?.add(42, Payload::from("C++"))?;
//! alice.connect(SKILL, 42, None)?;
//!
//! for skill in alice.neighbors(SKILL)? {
//!     println!("{} knows {:?}", alice.id(), skill.data()?);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod schema;
pub mod storage;
pub mod store;
pub mod typed;

// Re-export main types
pub use error::{DispatchError, GraphError, Result, SchemaError, StoreError, StoreResult};
pub use schema::{
    Codec, DynRecord, EdgeType, EdgeTypeDecl, Payload, Record, Schema, SchemaRegistry,
    Serialization, SerializationDispatcher, StructuredCodec, VertexType, VertexTypeDecl,
};
pub use storage::{BatchOperation, MemoryBackend, StorageBackend};
#[cfg(feature = "rocksdb-backend")]
pub use storage::RocksDBBackend;
pub use store::{
    make_id, Graph, GraphStore, LocalId, Statistics, StoreConfig, TypeTag, VertexId,
    WriteOptions,
};
pub use typed::{
    Connection, SchemaGraph, TypedVertex, TypedVertexCollection, TypedVertexFactory,
    TypedVertexIter, VertexDescriptor,
};

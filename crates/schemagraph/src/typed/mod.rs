//! Typed access surface generated from a finalized schema.
//!
//! [`SchemaGraph`] binds a [`Schema`](crate::Schema) to a store. Each vertex
//! type gets a [`TypedVertexCollection`], and every vertex is handled through
//! the single generic [`TypedVertex`] wrapper, parameterized at runtime by the
//! [`VertexDescriptor`] of its type.

mod collection;
mod descriptor;
mod graph;
mod vertex;

pub use collection::TypedVertexCollection;
pub use descriptor::{Connection, TypedVertexFactory, VertexDescriptor};
pub use graph::SchemaGraph;
pub use vertex::{TypedVertex, TypedVertexIter};

//! Schema declaration: vertex types, edge types and their payload codecs.
//!
//! A [`Schema`] is built once through a [`SchemaRegistry`] and never changes
//! afterwards. It is `Send + Sync` and is meant to be shared behind an
//! [`Arc`](std::sync::Arc) by every graph opened with it.
//!
//! ```
//! use schemagraph::{EdgeTypeDecl, SchemaRegistry, Serialization, VertexTypeDecl};
//!
//! const PERSON: i32 = 1;
//! const SKILL: i32 = 2;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_vertex_type(VertexTypeDecl::new("person", PERSON, Serialization::Generic))?;
//! registry.register_vertex_type(VertexTypeDecl::new("skill", SKILL, Serialization::Generic))?;
//! registry.register_edge_type(EdgeTypeDecl::new(PERSON, SKILL))?;
//! let schema = registry.finalize()?;
//!
//! assert!(schema.can_connect(SKILL, PERSON));
//! assert_eq!(schema.vertex_type(PERSON).unwrap().plural(), "persons");
//! # Ok::<(), schemagraph::SchemaError>(())
//! ```

mod codec;
mod dispatch;
mod registry;

pub use codec::{Codec, DynRecord, Payload, Record, Serialization, StructuredCodec};
pub use dispatch::SerializationDispatcher;
pub use registry::{EdgeTypeDecl, SchemaRegistry, VertexTypeDecl};

use crate::store::TypeTag;
use std::collections::HashMap;

/// Registered vertex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexType {
    tag: TypeTag,
    name: String,
    plural: String,
    codec: Codec,
}

impl VertexType {
    /// Type tag stored in vertex keys.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Singular name, e.g. `"person"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plural label naming the collection, e.g. `"persons"`.
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Payload codec of vertices of this type.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }
}

/// Registered edge type between two vertex types (unordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeType {
    lhs: TypeTag,
    rhs: TypeTag,
    codec: Codec,
}

impl EdgeType {
    /// Both ends, in declaration order.
    pub fn pair(&self) -> (TypeTag, TypeTag) {
        (self.lhs, self.rhs)
    }

    /// Whether the edge type joins `a` and `b`, in any order.
    pub fn joins(&self, a: TypeTag, b: TypeTag) -> bool {
        (self.lhs, self.rhs) == (a, b) || (self.lhs, self.rhs) == (b, a)
    }

    /// Payload codec of edges of this type.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }
}

/// Immutable, finalized schema.
#[derive(Debug, Clone)]
pub struct Schema {
    vertex_types: Vec<VertexType>,
    edge_types: Vec<EdgeType>,
    by_tag: HashMap<TypeTag, usize>,
    adjacency: HashMap<TypeTag, Vec<TypeTag>>,
    dispatcher: SerializationDispatcher,
}

impl Schema {
    fn build(vertex_types: Vec<VertexType>, edge_types: Vec<EdgeType>) -> Self {
        let mut dispatcher = SerializationDispatcher::default();
        let mut by_tag = HashMap::with_capacity(vertex_types.len());
        let mut adjacency: HashMap<TypeTag, Vec<TypeTag>> = HashMap::new();

        for (index, vertex_type) in vertex_types.iter().enumerate() {
            by_tag.insert(vertex_type.tag, index);
            dispatcher.insert_vertex(vertex_type.tag, vertex_type.codec);
            adjacency.entry(vertex_type.tag).or_default();
        }
        for edge_type in &edge_types {
            dispatcher.insert_pair(edge_type.lhs, edge_type.rhs, edge_type.codec);
            for (from, to) in [
                (edge_type.lhs, edge_type.rhs),
                (edge_type.rhs, edge_type.lhs),
            ] {
                let connectable = adjacency.entry(from).or_default();
                if !connectable.contains(&to) {
                    connectable.push(to);
                }
            }
        }

        Self {
            vertex_types,
            edge_types,
            by_tag,
            adjacency,
            dispatcher,
        }
    }

    /// Vertex types in declaration order.
    pub fn vertex_types(&self) -> &[VertexType] {
        &self.vertex_types
    }

    /// Edge types in declaration order.
    pub fn edge_types(&self) -> &[EdgeType] {
        &self.edge_types
    }

    /// Look up a vertex type by tag.
    pub fn vertex_type(&self, tag: TypeTag) -> Option<&VertexType> {
        self.by_tag.get(&tag).map(|index| &self.vertex_types[*index])
    }

    /// Look up a vertex type by singular name.
    pub fn vertex_type_by_name(&self, name: &str) -> Option<&VertexType> {
        self.vertex_types.iter().find(|t| t.name == name)
    }

    /// Look up a vertex type by plural label.
    pub fn vertex_type_by_plural(&self, plural: &str) -> Option<&VertexType> {
        self.vertex_types.iter().find(|t| t.plural == plural)
    }

    /// Types that vertices of type `tag` may connect to, each listed once,
    /// in declaration order. Empty for unknown tags.
    pub fn connectable(&self, tag: TypeTag) -> &[TypeTag] {
        self.adjacency
            .get(&tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether an edge type was declared between `a` and `b`.
    pub fn can_connect(&self, a: TypeTag, b: TypeTag) -> bool {
        self.dispatcher.has_pair(a, b)
    }

    /// Codec table of this schema.
    pub fn dispatcher(&self) -> &SerializationDispatcher {
        &self.dispatcher
    }
}

//! Facade binding a schema to a graph store.

use super::collection::TypedVertexCollection;
use super::descriptor::{TypedVertexFactory, VertexDescriptor};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::store::{Graph, GraphStore, Statistics, TypeTag};
#[cfg(feature = "rocksdb-backend")]
use log::info;
use std::sync::Arc;

/// Typed access to a graph store through a finalized [`Schema`].
///
/// Any number of `SchemaGraph`s may share one schema. Collections and vertex
/// wrappers borrow the facade and are cheap to create.
///
/// # Example
///
/// ```
/// use schemagraph::{
///     EdgeTypeDecl, Payload, SchemaGraph, SchemaRegistry, Serialization, VertexTypeDecl,
/// };
/// use std::sync::Arc;
///
/// # fn main() -> schemagraph::Result<()> {
/// let mut registry = SchemaRegistry::new();
/// registry
///     .register_vertex_type(VertexTypeDecl::new("person", 1, Serialization::Generic))?
///     .register_vertex_type(VertexTypeDecl::new("skill", 2, Serialization::Generic))?
///     .register_edge_type(EdgeTypeDecl::new(1, 2))?;
/// let graph = SchemaGraph::in_memory(Arc::new(registry.finalize()?));
///
/// let persons = graph.collection("persons").unwrap();
/// let skills = graph.collection("skills").unwrap();
/// let alice = persons.add(0, Payload::from("Alice"))?;
/// skills.add(42, Payload::from("C++"))?;
/// alice.add_named("skill", 42, None)?;
///
/// let mut known = alice.neighbors_named("skills")?;
/// let skill = known.next().unwrap();
/// assert_eq!(skill.id(), 42);
/// assert_eq!(skill.data()?.and_then(Payload::as_str), Some("C++"));
/// assert!(known.next().is_none());
/// # Ok(())
/// # }
/// ```
pub struct SchemaGraph {
    schema: Arc<Schema>,
    store: Box<dyn GraphStore>,
    factory: TypedVertexFactory,
}

impl SchemaGraph {
    /// Bind a schema to an existing store.
    pub fn new(schema: Arc<Schema>, store: Box<dyn GraphStore>) -> Self {
        let factory = TypedVertexFactory::new(&schema);
        Self {
            schema,
            store,
            factory,
        }
    }

    /// Open or create a persistent graph at the given path.
    ///
    /// The store configuration is read from `<path>/config.json` when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`](crate::StoreError::Backend) if the
    /// database cannot be opened.
    #[cfg(feature = "rocksdb-backend")]
    pub fn open<P: AsRef<std::path::Path>>(schema: Arc<Schema>, path: P) -> Result<Self> {
        info!("Opening typed graph at path: {:?}", path.as_ref());
        let store = Graph::open(path)?;
        Ok(Self::new(schema, Box::new(store)))
    }

    /// Open or create a persistent graph with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`](crate::StoreError::Backend) if the
    /// database cannot be opened.
    #[cfg(feature = "rocksdb-backend")]
    pub fn open_with_config<P: AsRef<std::path::Path>>(
        schema: Arc<Schema>,
        path: P,
        config: crate::store::StoreConfig,
    ) -> Result<Self> {
        info!("Opening typed graph at path: {:?}", path.as_ref());
        let store = Graph::open_with_config(path, config)?;
        Ok(Self::new(schema, Box::new(store)))
    }

    /// Create a typed graph over an in-memory store.
    ///
    /// **Warning**: All data is lost when the graph is dropped.
    pub fn in_memory(schema: Arc<Schema>) -> Self {
        Self::new(schema, Box::new(Graph::in_memory()))
    }

    /// Collection of the vertex type with the given plural label.
    pub fn collection(&self, plural: &str) -> Option<TypedVertexCollection<'_>> {
        self.factory
            .descriptor_by_plural(plural)
            .map(|descriptor| TypedVertexCollection::new(self, descriptor))
    }

    /// Collection of the vertex type `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownVertexType`] if the tag is not registered.
    pub fn vertices_of(&self, tag: TypeTag) -> Result<TypedVertexCollection<'_>> {
        Ok(TypedVertexCollection::new(self, self.descriptor(tag)?))
    }

    /// One collection per vertex type, in schema declaration order.
    pub fn collections(&self) -> impl Iterator<Item = TypedVertexCollection<'_>> {
        self.factory
            .descriptors()
            .iter()
            .map(move |descriptor| TypedVertexCollection::new(self, descriptor))
    }

    /// Untyped store, for bulk or low-level operations.
    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    /// Schema this graph was opened with.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Descriptor factory built from the schema.
    pub fn factory(&self) -> &TypedVertexFactory {
        &self.factory
    }

    /// Flush pending writes of the store.
    pub fn commit(&self) -> Result<()> {
        Ok(self.store.commit()?)
    }

    /// Store usage metrics.
    pub fn statistics(&self) -> Result<Statistics> {
        Ok(self.store.statistics()?)
    }

    pub(crate) fn descriptor(&self, tag: TypeTag) -> Result<&VertexDescriptor> {
        self.factory
            .descriptor(tag)
            .ok_or_else(|| SchemaError::UnknownVertexType { tag }.into())
    }
}

impl std::fmt::Debug for SchemaGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaGraph")
            .field("vertex_types", &self.schema.vertex_types().len())
            .field("edge_types", &self.schema.edge_types().len())
            .finish_non_exhaustive()
    }
}

//! Generic vertex wrapper, parameterized by its type descriptor.

use super::descriptor::{Connection, VertexDescriptor};
use super::graph::SchemaGraph;
use crate::error::{DispatchError, Result};
use crate::schema::Payload;
use crate::store::{make_id, LocalId, TypeTag, VertexId, WriteOptions};
use log::trace;
use once_cell::unsync::OnceCell;

/// Short-lived handle on one vertex.
///
/// Wrappers are created on every access and own nothing but their key and,
/// once [`data`](Self::data) has been called, the decoded payload. The
/// payload is read at most once per wrapper: later changes made through
/// another wrapper are not seen.
///
/// Edge operations are only available toward the types declared connectable
/// with this vertex's type; any other type fails with
/// [`DispatchError::UnregisteredEdgeTypePair`] before the store is called.
pub struct TypedVertex<'g> {
    graph: &'g SchemaGraph,
    descriptor: &'g VertexDescriptor,
    key: VertexId,
    data: OnceCell<Option<Payload>>,
}

impl<'g> TypedVertex<'g> {
    pub(crate) fn new(
        graph: &'g SchemaGraph,
        descriptor: &'g VertexDescriptor,
        key: VertexId,
    ) -> Self {
        Self {
            graph,
            descriptor,
            key,
            data: OnceCell::new(),
        }
    }

    /// Identifier within the vertex type.
    pub fn id(&self) -> LocalId {
        self.key.id
    }

    /// Full store key.
    pub fn key(&self) -> VertexId {
        self.key
    }

    /// Tag of the vertex type.
    pub fn vertex_type(&self) -> TypeTag {
        self.key.tag
    }

    /// Singular name of the vertex type.
    pub fn type_name(&self) -> &'g str {
        self.descriptor.name()
    }

    /// Descriptor of the vertex type.
    pub fn descriptor(&self) -> &'g VertexDescriptor {
        self.descriptor
    }

    /// Whether the vertex exists in the store.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.graph.store().contains_vertex(self.key)?)
    }

    /// Decoded payload, loaded from the store on first call and cached.
    ///
    /// Returns `None` if the vertex has no payload or does not exist.
    pub fn data(&self) -> Result<Option<&Payload>> {
        self.data
            .get_or_try_init(|| self.load())
            .map(Option::as_ref)
    }

    fn load(&self) -> Result<Option<Payload>> {
        trace!("Loading payload of {} {}", self.descriptor.name(), self.key);
        match self.graph.store().get_vertex(self.key)? {
            Some(bytes) => Ok(Some(self.descriptor.codec().decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replace the cached payload. Call [`update`](Self::update) to persist it.
    pub fn set_data(&mut self, payload: impl Into<Option<Payload>>) {
        self.data = OnceCell::with_value(payload.into());
    }

    /// Persist the current payload.
    pub fn update(&self) -> Result<()> {
        self.update_with(WriteOptions::default())
    }

    /// [`update`](Self::update) with explicit store options.
    pub fn update_with(&self, opts: WriteOptions) -> Result<()> {
        let bytes = self
            .data()?
            .map(|payload| self.descriptor.codec().encode(payload))
            .transpose()?;
        Ok(self
            .graph
            .store()
            .insert_vertex(self.key, bytes.as_deref(), opts)?)
    }

    fn connection(&self, tag: TypeTag) -> Result<&'g Connection> {
        self.descriptor.connection(tag).ok_or_else(|| {
            DispatchError::UnregisteredEdgeTypePair {
                lhs: self.key.tag,
                rhs: tag,
            }
            .into()
        })
    }

    fn unknown_accessor(&self, accessor: String) -> DispatchError {
        DispatchError::UnknownAccessor {
            vertex_type: self.descriptor.name().to_string(),
            accessor,
        }
    }

    /// Connect this vertex to vertex `id` of type `tag`.
    ///
    /// Without a payload the edge gets the pair's default payload, if it has
    /// one. Both vertices must already exist.
    pub fn connect(
        &self,
        tag: TypeTag,
        id: LocalId,
        payload: impl Into<Option<Payload>>,
    ) -> Result<&Self> {
        self.connect_with(tag, id, payload, WriteOptions::default())
    }

    /// [`connect`](Self::connect) with explicit store options.
    pub fn connect_with(
        &self,
        tag: TypeTag,
        id: LocalId,
        payload: impl Into<Option<Payload>>,
        opts: WriteOptions,
    ) -> Result<&Self> {
        let codec = self.connection(tag)?.codec();
        let bytes = payload
            .into()
            .or_else(|| codec.default_payload())
            .map(|payload| codec.encode(&payload))
            .transpose()?;
        self.graph
            .store()
            .insert_edge(self.key, make_id(tag, id), bytes.as_deref(), opts)?;
        Ok(self)
    }

    /// Connect this vertex to many vertices of type `tag` in one store call.
    ///
    /// Edges are created without payload. With `create_vertices`, missing
    /// endpoints are inserted without payload instead of failing.
    pub fn connect_bulk(
        &self,
        tag: TypeTag,
        ids: &[LocalId],
        create_vertices: bool,
    ) -> Result<&Self> {
        self.connect_bulk_with(tag, ids, create_vertices, WriteOptions::default())
    }

    /// [`connect_bulk`](Self::connect_bulk) with explicit store options.
    pub fn connect_bulk_with(
        &self,
        tag: TypeTag,
        ids: &[LocalId],
        create_vertices: bool,
        opts: WriteOptions,
    ) -> Result<&Self> {
        self.connection(tag)?;
        self.graph
            .store()
            .insert_edges(self.key, tag, ids, create_vertices, opts)?;
        Ok(self)
    }

    /// Remove the edge between this vertex and vertex `id` of type `tag`.
    pub fn disconnect(&self, tag: TypeTag, id: LocalId) -> Result<&Self> {
        self.connection(tag)?;
        self.graph
            .store()
            .discard_edge(self.key, make_id(tag, id), WriteOptions::default())?;
        Ok(self)
    }

    /// Neighbors of type `tag`, in ascending id order, one fresh wrapper per
    /// step.
    pub fn neighbors(&self, tag: TypeTag) -> Result<TypedVertexIter<'g>> {
        let connection = self.connection(tag)?;
        let descriptor = self.graph.descriptor(connection.tag())?;
        let keys = self.graph.store().neighbors(self.key, Some(tag))?;
        Ok(TypedVertexIter::new(self.graph, descriptor, keys))
    }

    /// `add_<name>`: [`connect`](Self::connect) addressing the other type by
    /// its singular name.
    pub fn add_named(
        &self,
        name: &str,
        id: LocalId,
        payload: impl Into<Option<Payload>>,
    ) -> Result<&Self> {
        let connection = self
            .descriptor
            .connection_by_name(name)
            .ok_or_else(|| self.unknown_accessor(format!("add_{name}")))?;
        self.connect(connection.tag(), id, payload)
    }

    /// `discard_<name>`: [`disconnect`](Self::disconnect) addressing the other
    /// type by its singular name.
    pub fn discard_named(&self, name: &str, id: LocalId) -> Result<&Self> {
        let connection = self
            .descriptor
            .connection_by_name(name)
            .ok_or_else(|| self.unknown_accessor(format!("discard_{name}")))?;
        self.disconnect(connection.tag(), id)
    }

    /// `<plural>`: [`neighbors`](Self::neighbors) addressing the other type by
    /// its plural label.
    pub fn neighbors_named(&self, plural: &str) -> Result<TypedVertexIter<'g>> {
        let connection = self
            .descriptor
            .connection_by_plural(plural)
            .ok_or_else(|| self.unknown_accessor(plural.to_string()))?;
        self.neighbors(connection.tag())
    }

    /// Connect this vertex to another wrapped vertex.
    pub fn add(&self, other: &TypedVertex<'_>, payload: impl Into<Option<Payload>>) -> Result<&Self> {
        self.connect(other.key.tag, other.key.id, payload)
    }

    /// Remove the edge between this vertex and another wrapped vertex.
    pub fn discard(&self, other: &TypedVertex<'_>) -> Result<&Self> {
        self.disconnect(other.key.tag, other.key.id)
    }

    /// Decoded payload of the edge toward another wrapped vertex.
    ///
    /// Returns `None` if there is no such edge or if it carries no payload.
    pub fn edge_data(&self, other: &TypedVertex<'_>) -> Result<Option<Payload>> {
        let codec = self.connection(other.key.tag)?.codec();
        match self.graph.store().get_edge(self.key, other.key)? {
            Some(bytes) => Ok(Some(codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for TypedVertex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedVertex")
            .field("type", &self.descriptor.name())
            .field("key", &self.key)
            .field("data", &self.data.get())
            .finish()
    }
}

/// Iterator creating one [`TypedVertex`] per key.
pub struct TypedVertexIter<'g> {
    graph: &'g SchemaGraph,
    descriptor: &'g VertexDescriptor,
    keys: std::vec::IntoIter<VertexId>,
}

impl<'g> TypedVertexIter<'g> {
    pub(crate) fn new(
        graph: &'g SchemaGraph,
        descriptor: &'g VertexDescriptor,
        keys: Vec<VertexId>,
    ) -> Self {
        Self {
            graph,
            descriptor,
            keys: keys.into_iter(),
        }
    }
}

impl<'g> Iterator for TypedVertexIter<'g> {
    type Item = TypedVertex<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        trace!("Visiting {} {key}", self.descriptor.name());
        Some(TypedVertex::new(self.graph, self.descriptor, key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for TypedVertexIter<'_> {}

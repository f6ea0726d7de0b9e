//! All vertices of one type.

use super::descriptor::VertexDescriptor;
use super::graph::SchemaGraph;
use super::vertex::{TypedVertex, TypedVertexIter};
use crate::error::{GraphError, Result};
use crate::schema::Payload;
use crate::store::{make_id, LocalId, TypeTag, WriteOptions};
use log::trace;

/// CRUD over the vertices of one type.
///
/// Obtained from [`SchemaGraph::collection`] or [`SchemaGraph::vertices_of`].
#[derive(Clone, Copy)]
pub struct TypedVertexCollection<'g> {
    graph: &'g SchemaGraph,
    descriptor: &'g VertexDescriptor,
}

impl<'g> TypedVertexCollection<'g> {
    pub(crate) fn new(graph: &'g SchemaGraph, descriptor: &'g VertexDescriptor) -> Self {
        Self { graph, descriptor }
    }

    /// Tag of the vertex type.
    pub fn vertex_type(&self) -> TypeTag {
        self.descriptor.tag()
    }

    /// Singular name of the vertex type.
    pub fn name(&self) -> &'g str {
        self.descriptor.name()
    }

    /// Plural label of the vertex type.
    pub fn plural(&self) -> &'g str {
        self.descriptor.plural()
    }

    /// Descriptor of the vertex type.
    pub fn descriptor(&self) -> &'g VertexDescriptor {
        self.descriptor
    }

    /// Encode `payload`, or the default payload of the type when `None`.
    fn encode(&self, payload: Option<Payload>) -> Result<Option<Vec<u8>>> {
        let codec = self.descriptor.codec();
        payload
            .or_else(|| codec.default_payload())
            .map(|payload| codec.encode(&payload))
            .transpose()
    }

    /// Insert or overwrite a vertex.
    ///
    /// Without a payload the type's default payload is stored, if it has one.
    ///
    /// # Errors
    ///
    /// Codec errors are raised before the store is called. Store errors are
    /// returned unmodified.
    pub fn add(&self, id: LocalId, payload: impl Into<Option<Payload>>) -> Result<TypedVertex<'g>> {
        self.add_with(id, payload, WriteOptions::default())
    }

    /// [`add`](Self::add) with explicit store options.
    pub fn add_with(
        &self,
        id: LocalId,
        payload: impl Into<Option<Payload>>,
        opts: WriteOptions,
    ) -> Result<TypedVertex<'g>> {
        let bytes = self.encode(payload.into())?;
        let key = make_id(self.descriptor.tag(), id);
        self.graph
            .store()
            .insert_vertex(key, bytes.as_deref(), opts)?;
        Ok(self.vertex(id))
    }

    /// Insert many vertices in one store call.
    ///
    /// `payloads`, when given, must match `ids` in length. Without payloads
    /// every vertex gets the type's default payload, if it has one.
    ///
    /// # Errors
    ///
    /// Every payload is encoded before the store is called, so a codec error
    /// leaves the store untouched.
    pub fn add_bulk(&self, ids: &[LocalId], payloads: Option<Vec<Payload>>) -> Result<()> {
        self.add_bulk_with(ids, payloads, WriteOptions::default())
    }

    /// [`add_bulk`](Self::add_bulk) with explicit store options.
    pub fn add_bulk_with(
        &self,
        ids: &[LocalId],
        payloads: Option<Vec<Payload>>,
        opts: WriteOptions,
    ) -> Result<()> {
        let codec = self.descriptor.codec();
        let encoded = match payloads {
            Some(payloads) => Some(
                payloads
                    .iter()
                    .map(|payload| codec.encode(payload))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => match codec.default_payload() {
                Some(default) => Some(vec![codec.encode(&default)?; ids.len()]),
                None => None,
            },
        };
        self.graph.store().insert_vertices(
            self.descriptor.tag(),
            ids,
            encoded.as_deref(),
            opts,
        )?;
        trace!("{} {} added in bulk", ids.len(), self.plural());
        Ok(())
    }

    /// Decoded payload of a vertex, `None` if the vertex is absent or has no
    /// payload.
    pub fn get(&self, id: LocalId) -> Result<Option<Payload>> {
        let key = make_id(self.descriptor.tag(), id);
        match self.graph.store().get_vertex(key)? {
            Some(bytes) => Ok(Some(self.descriptor.codec().decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Wrapper of a vertex. Never fails: the payload is only read on first
    /// access to [`TypedVertex::data`].
    pub fn vertex(&self, id: LocalId) -> TypedVertex<'g> {
        TypedVertex::new(self.graph, self.descriptor, make_id(self.descriptor.tag(), id))
    }

    /// Remove a vertex and its edges. Absent vertices are ignored.
    pub fn discard(&self, id: LocalId) -> Result<()> {
        let key = make_id(self.descriptor.tag(), id);
        Ok(self
            .graph
            .store()
            .discard_vertex(key, WriteOptions::default())?)
    }

    /// Whether the vertex exists.
    pub fn contains(&self, id: LocalId) -> Result<bool> {
        let key = make_id(self.descriptor.tag(), id);
        Ok(self.graph.store().contains_vertex(key)?)
    }

    /// Number of vertices of this type.
    pub fn len(&self) -> Result<usize> {
        Ok(self.graph.store().count_vertices_of(self.descriptor.tag())?)
    }

    /// Whether there is no vertex of this type.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Identifiers of the vertices of this type, in ascending order.
    pub fn ids(&self) -> Result<Vec<LocalId>> {
        Ok(self
            .graph
            .store()
            .vertices_of(self.descriptor.tag())?
            .into_iter()
            .map(|key| key.id)
            .collect())
    }

    /// Wrappers of the vertices of this type, in ascending id order.
    pub fn iter(&self) -> Result<TypedVertexIter<'g>> {
        let keys = self.graph.store().vertices_of(self.descriptor.tag())?;
        Ok(TypedVertexIter::new(self.graph, self.descriptor, keys))
    }

    /// Remove every vertex of this type.
    ///
    /// Not supported: always returns [`GraphError::Unsupported`]. Discard
    /// vertices one by one with [`discard`](Self::discard) instead.
    pub fn clear(&self) -> Result<()> {
        Err(GraphError::Unsupported {
            operation: format!("clear {}", self.plural()),
        })
    }
}

impl std::fmt::Debug for TypedVertexCollection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedVertexCollection")
            .field("tag", &self.descriptor.tag())
            .field("plural", &self.descriptor.plural())
            .finish()
    }
}

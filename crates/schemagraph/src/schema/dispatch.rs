//! Codec lookup per vertex type and per vertex type pair.

use super::codec::{Codec, Payload};
use crate::error::{DispatchError, Result, SchemaError};
use crate::store::TypeTag;
use std::collections::HashMap;

/// Table of codecs resolved once at schema finalization.
///
/// Pair codecs are stored under both orderings of the pair, so looking up
/// `(a, b)` and `(b, a)` returns the same codec.
#[derive(Debug, Clone, Default)]
pub struct SerializationDispatcher {
    vertices: HashMap<TypeTag, Codec>,
    pairs: HashMap<(TypeTag, TypeTag), Codec>,
}

impl SerializationDispatcher {
    pub(crate) fn insert_vertex(&mut self, tag: TypeTag, codec: Codec) {
        self.vertices.insert(tag, codec);
    }

    pub(crate) fn insert_pair(&mut self, lhs: TypeTag, rhs: TypeTag, codec: Codec) {
        self.pairs.insert((lhs, rhs), codec);
        self.pairs.insert((rhs, lhs), codec);
    }

    /// Codec of a vertex type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownVertexType`] if the tag is not registered.
    pub fn vertex_codec(&self, tag: TypeTag) -> Result<&Codec> {
        self.vertices
            .get(&tag)
            .ok_or_else(|| SchemaError::UnknownVertexType { tag }.into())
    }

    /// Codec of the edges between two vertex types.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnregisteredEdgeTypePair`] if no edge type was
    /// declared between them.
    pub fn pair_codec(&self, lhs: TypeTag, rhs: TypeTag) -> Result<&Codec> {
        self.pairs
            .get(&(lhs, rhs))
            .ok_or_else(|| DispatchError::UnregisteredEdgeTypePair { lhs, rhs }.into())
    }

    /// Whether an edge type was declared between two vertex types.
    pub fn has_pair(&self, lhs: TypeTag, rhs: TypeTag) -> bool {
        self.pairs.contains_key(&(lhs, rhs))
    }

    /// Encode a vertex payload.
    pub fn encode_vertex(&self, tag: TypeTag, payload: &Payload) -> Result<Vec<u8>> {
        self.vertex_codec(tag)?.encode(payload)
    }

    /// Decode a vertex payload.
    pub fn decode_vertex(&self, tag: TypeTag, bytes: &[u8]) -> Result<Payload> {
        self.vertex_codec(tag)?.decode(bytes)
    }

    /// Encode an edge payload.
    pub fn encode_edge(&self, lhs: TypeTag, rhs: TypeTag, payload: &Payload) -> Result<Vec<u8>> {
        self.pair_codec(lhs, rhs)?.encode(payload)
    }

    /// Decode an edge payload.
    pub fn decode_edge(&self, lhs: TypeTag, rhs: TypeTag, bytes: &[u8]) -> Result<Payload> {
        self.pair_codec(lhs, rhs)?.decode(bytes)
    }
}

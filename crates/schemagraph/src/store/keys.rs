//! Byte layout of vertex and edge keys and of their stored values.
//!
//! ```text
//! vertex:  'N' tag(4) id(8)
//! edge:    'E' tag(4) id(8) tag(4) id(8)
//! value:   0x00                  (no payload)
//!          0x01 payload(n)       (payload, possibly empty)
//! ```
//!
//! Tags are big-endian with the sign bit flipped and ids are big-endian, so
//! lexicographic key order equals `(tag, id)` order and every prefix scan
//! (vertices of a type, edges of a vertex, edges of a vertex toward a type)
//! returns its keys sorted.

use super::{LocalId, TypeTag, VertexId};

pub(crate) const VERTEX_PREFIX: u8 = b'N';
pub(crate) const EDGE_PREFIX: u8 = b'E';

const TAG_LEN: usize = 4;
const ID_LEN: usize = 8;
const VERTEX_LEN: usize = TAG_LEN + ID_LEN;

/// Length of an encoded vertex key.
pub(crate) const VERTEX_KEY_LEN: usize = 1 + VERTEX_LEN;

/// Length of an encoded edge key.
pub(crate) const EDGE_KEY_LEN: usize = 1 + 2 * VERTEX_LEN;

fn encode_tag(tag: TypeTag) -> [u8; TAG_LEN] {
    ((tag as u32) ^ 0x8000_0000).to_be_bytes()
}

fn decode_tag(bytes: &[u8]) -> TypeTag {
    let mut raw = [0u8; TAG_LEN];
    raw.copy_from_slice(&bytes[..TAG_LEN]);
    (u32::from_be_bytes(raw) ^ 0x8000_0000) as TypeTag
}

fn decode_local(bytes: &[u8]) -> LocalId {
    let mut raw = [0u8; ID_LEN];
    raw.copy_from_slice(&bytes[..ID_LEN]);
    LocalId::from_be_bytes(raw)
}

fn push_vertex(key: &mut Vec<u8>, vertex: VertexId) {
    key.extend_from_slice(&encode_tag(vertex.tag));
    key.extend_from_slice(&vertex.id.to_be_bytes());
}

fn decode_vertex_at(bytes: &[u8]) -> VertexId {
    VertexId {
        tag: decode_tag(bytes),
        id: decode_local(&bytes[TAG_LEN..]),
    }
}

/// Key of a vertex record.
pub(crate) fn vertex_key(vertex: VertexId) -> Vec<u8> {
    let mut key = Vec::with_capacity(VERTEX_KEY_LEN);
    key.push(VERTEX_PREFIX);
    push_vertex(&mut key, vertex);
    key
}

/// Prefix shared by all vertex keys of one type.
pub(crate) fn vertex_type_prefix(tag: TypeTag) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + TAG_LEN);
    key.push(VERTEX_PREFIX);
    key.extend_from_slice(&encode_tag(tag));
    key
}

/// Key of the `lhs -> rhs` half of an edge.
pub(crate) fn edge_key(lhs: VertexId, rhs: VertexId) -> Vec<u8> {
    let mut key = Vec::with_capacity(EDGE_KEY_LEN);
    key.push(EDGE_PREFIX);
    push_vertex(&mut key, lhs);
    push_vertex(&mut key, rhs);
    key
}

/// Prefix shared by all edge keys starting at `vertex`, optionally narrowed
/// to neighbors of type `filter`.
pub(crate) fn edge_prefix(vertex: VertexId, filter: Option<TypeTag>) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + VERTEX_LEN + TAG_LEN);
    key.push(EDGE_PREFIX);
    push_vertex(&mut key, vertex);
    if let Some(tag) = filter {
        key.extend_from_slice(&encode_tag(tag));
    }
    key
}

/// Decode a vertex key, `None` if the bytes are not a vertex key.
pub(crate) fn decode_vertex_key(key: &[u8]) -> Option<VertexId> {
    if key.len() != VERTEX_KEY_LEN || key[0] != VERTEX_PREFIX {
        return None;
    }
    Some(decode_vertex_at(&key[1..]))
}

/// Decode both ends of an edge key, `None` if the bytes are not an edge key.
pub(crate) fn decode_edge_key(key: &[u8]) -> Option<(VertexId, VertexId)> {
    if key.len() != EDGE_KEY_LEN || key[0] != EDGE_PREFIX {
        return None;
    }
    Some((
        decode_vertex_at(&key[1..]),
        decode_vertex_at(&key[1 + VERTEX_LEN..]),
    ))
}

const NO_PAYLOAD: u8 = 0;
const PAYLOAD: u8 = 1;

/// Stored value of a vertex or edge record.
pub(crate) fn encode_value(payload: Option<&[u8]>) -> Vec<u8> {
    match payload {
        Some(bytes) => {
            let mut value = Vec::with_capacity(1 + bytes.len());
            value.push(PAYLOAD);
            value.extend_from_slice(bytes);
            value
        }
        None => vec![NO_PAYLOAD],
    }
}

/// Payload of a stored value, `None` for records stored without one.
pub(crate) fn decode_value(value: &[u8]) -> Option<Vec<u8>> {
    match value.split_first() {
        Some((&PAYLOAD, bytes)) => Some(bytes.to_vec()),
        _ => None,
    }
}

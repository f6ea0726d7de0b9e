//! Error types for schemagraph operations.
//!
//! Errors fall in three families, each raised at a well-defined moment:
//!
//! - [`SchemaError`]: while a schema is being declared, before any graph exists
//! - [`DispatchError`]: on first use of an unregistered type, pair or payload kind,
//!   always before the store is touched
//! - [`StoreError`]: raised by the low-level store and surfaced unmodified
//!
//! All fallible operations return [`Result<T>`].

use crate::store::VertexId;
use thiserror::Error;

/// Result type alias for schemagraph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Result type alias for low-level store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Comprehensive error type for all typed graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Invalid schema declaration
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Codec lookup or payload dispatch failure
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Error reported by the low-level graph store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation declared by the API but intentionally not provided
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Name of the operation
        operation: String,
    },
}

impl GraphError {
    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Whether this error originates from the low-level store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, GraphError::Store(_))
    }
}

/// Errors raised while declaring a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A vertex type with the same tag, name or plural is already registered
    #[error("Duplicate vertex type '{name}' (tag {tag}): {reason}")]
    DuplicateVertexType {
        /// Name of the rejected declaration
        name: String,
        /// Tag of the rejected declaration
        tag: i32,
        /// What collided (tag, name or plural)
        reason: String,
    },

    /// An edge refers to a vertex type that is not registered (yet)
    #[error("Unknown vertex type: tag {tag}")]
    UnknownVertexType {
        /// Offending tag
        tag: i32,
    },

    /// Registration attempted after the registry was finalized
    #[error("Schema is frozen, cannot register {what}")]
    SchemaFrozen {
        /// Kind of declaration that was rejected
        what: String,
    },

    /// Same unordered type pair declared twice with different codecs
    #[error("Conflicting declaration for edge type ({lhs}, {rhs}): {reason}")]
    ConflictingEdgeType {
        /// One end of the pair
        lhs: i32,
        /// Other end of the pair
        rhs: i32,
        /// How the declarations differ
        reason: String,
    },
}

/// Errors raised when resolving codecs for payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No adjacency capability was declared between the two types
    #[error("No edge type registered between vertex types {lhs} and {rhs}")]
    UnregisteredEdgeTypePair {
        /// Type of the vertex the edge starts from
        lhs: i32,
        /// Type of the vertex on the other end
        rhs: i32,
    },

    /// Serialization method name does not match any known codec
    #[error("Unexpected serialization method '{name}'")]
    UnknownSerializationMethod {
        /// Rejected method name
        name: String,
    },

    /// Name-driven access to a type the vertex type is not connected to
    #[error("Vertex type '{vertex_type}' has no accessor '{accessor}'")]
    UnknownAccessor {
        /// Name of the vertex type
        vertex_type: String,
        /// Requested accessor
        accessor: String,
    },

    /// A payload variant was given to a codec that cannot encode it
    #[error("Codec '{codec}' cannot encode {payload} payload")]
    PayloadMismatch {
        /// Codec that rejected the payload
        codec: String,
        /// Description of the payload kind
        payload: String,
    },
}

/// Errors reported by the low-level graph store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced vertex is not in the store
    #[error("Missing vertex {vertex}")]
    MissingVertex {
        /// Absent vertex
        vertex: VertexId,
    },

    /// Edge rejected by the store (e.g. a vertex connected to itself)
    #[error("Invalid edge ({lhs}, {rhs})")]
    InvalidEdge {
        /// One end of the edge
        lhs: VertexId,
        /// Other end of the edge
        rhs: VertexId,
    },

    /// Arguments rejected by the store (e.g. mismatched bulk array lengths)
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem
        message: String,
    },

    /// Write attempted on a store opened read-only
    #[error("Store is read-only, cannot {operation}")]
    ReadOnly {
        /// Rejected operation
        operation: String,
    },

    /// Storage backend error (RocksDB, file I/O, etc.)
    #[error("Storage error: {message}")]
    Backend {
        /// Detailed error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Create a backend error from a message and optional source.
    pub fn backend<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::make_id;

    #[test]
    fn test_duplicate_vertex_type_error() {
        let err = SchemaError::DuplicateVertexType {
            name: "person".to_string(),
            tag: 1,
            reason: "tag already used by 'human'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate vertex type 'person' (tag 1): tag already used by 'human'"
        );
    }

    #[test]
    fn test_unregistered_pair_error() {
        let err: GraphError = DispatchError::UnregisteredEdgeTypePair { lhs: 1, rhs: 3 }.into();
        assert_eq!(
            err.to_string(),
            "No edge type registered between vertex types 1 and 3"
        );
        assert!(!err.is_store_error());
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: GraphError = StoreError::MissingVertex {
            vertex: make_id(0, 2),
        }
        .into();
        assert_eq!(err.to_string(), "Missing vertex (0:2)");
        assert!(err.is_store_error());
    }

    #[test]
    fn test_backend_error() {
        let err = StoreError::backend("Failed to write to disk", None::<std::io::Error>);
        assert_eq!(err.to_string(), "Storage error: Failed to write to disk");
    }

    #[test]
    fn test_unsupported_error() {
        let err = GraphError::Unsupported {
            operation: "clear".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported operation: clear");
    }
}

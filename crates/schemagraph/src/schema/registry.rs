//! Order-sensitive, validated schema declarations.

use super::codec::{Codec, Serialization};
use super::{EdgeType, Schema, VertexType};
use crate::error::SchemaError;
use crate::store::TypeTag;
use log::debug;

/// Declaration of a vertex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexTypeDecl {
    name: String,
    tag: TypeTag,
    serialization: Serialization,
    plural: Option<String>,
    default_payload: bool,
}

impl VertexTypeDecl {
    /// Declare a vertex type with the default plural (`name` + `"s"`) and
    /// the default payload flag set.
    pub fn new(name: impl Into<String>, tag: TypeTag, serialization: Serialization) -> Self {
        Self {
            name: name.into(),
            tag,
            serialization,
            plural: None,
            default_payload: true,
        }
    }

    /// Builder pattern: override the plural label.
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    /// Builder pattern: set the default payload flag.
    pub fn with_default_payload(mut self, default_payload: bool) -> Self {
        self.default_payload = default_payload;
        self
    }
}

/// Declaration of an edge type between two vertex types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTypeDecl {
    lhs: TypeTag,
    rhs: TypeTag,
    serialization: Serialization,
    default_payload: bool,
}

impl EdgeTypeDecl {
    /// Declare that vertices of types `lhs` and `rhs` may be connected.
    ///
    /// Edge payloads default to the raw codec.
    pub fn new(lhs: TypeTag, rhs: TypeTag) -> Self {
        Self {
            lhs,
            rhs,
            serialization: Serialization::Raw,
            default_payload: true,
        }
    }

    /// Builder pattern: set the edge payload codec.
    pub fn with_serialization(mut self, serialization: Serialization) -> Self {
        self.serialization = serialization;
        self
    }

    /// Builder pattern: set the default payload flag.
    pub fn with_default_payload(mut self, default_payload: bool) -> Self {
        self.default_payload = default_payload;
        self
    }
}

/// Accumulates declarations for exactly one schema.
///
/// Declarations are validated as they are made, so an edge type can only
/// name vertex types registered before it. Once [`finalize`](Self::finalize)
/// has run, every further call fails with [`SchemaError::SchemaFrozen`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    vertex_types: Vec<VertexType>,
    edge_types: Vec<EdgeType>,
    frozen: bool,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self, what: &str) -> Result<(), SchemaError> {
        if self.frozen {
            return Err(SchemaError::SchemaFrozen {
                what: what.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_known(&self, tag: TypeTag) -> Result<(), SchemaError> {
        if self.vertex_types.iter().any(|t| t.tag() == tag) {
            Ok(())
        } else {
            Err(SchemaError::UnknownVertexType { tag })
        }
    }

    /// Register a vertex type.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateVertexType`] if the tag, the name or the
    ///   plural label is already taken
    /// - [`SchemaError::SchemaFrozen`] after finalization
    pub fn register_vertex_type(&mut self, decl: VertexTypeDecl) -> Result<&mut Self, SchemaError> {
        self.ensure_open("vertex type")?;
        let plural = decl.plural.unwrap_or_else(|| format!("{}s", decl.name));

        let clash = self.vertex_types.iter().find_map(|existing| {
            if existing.tag == decl.tag {
                Some(format!("tag already used by '{}'", existing.name))
            } else if existing.name == decl.name {
                Some(format!("name already used by tag {}", existing.tag))
            } else if existing.plural == plural {
                Some(format!("plural '{plural}' already used by '{}'", existing.name))
            } else {
                None
            }
        });
        if let Some(reason) = clash {
            return Err(SchemaError::DuplicateVertexType {
                name: decl.name,
                tag: decl.tag,
                reason,
            });
        }

        self.vertex_types.push(VertexType {
            tag: decl.tag,
            name: decl.name,
            plural,
            codec: Codec::new(decl.serialization, decl.default_payload),
        });
        Ok(self)
    }

    /// Register an edge type.
    ///
    /// Declaring the same pair again, in either order and with the same
    /// codec, is a no-op.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnknownVertexType`] if either end is not registered yet
    /// - [`SchemaError::ConflictingEdgeType`] if the pair was declared with
    ///   another codec
    /// - [`SchemaError::SchemaFrozen`] after finalization
    pub fn register_edge_type(&mut self, decl: EdgeTypeDecl) -> Result<&mut Self, SchemaError> {
        self.ensure_open("edge type")?;
        self.ensure_known(decl.lhs)?;
        self.ensure_known(decl.rhs)?;

        let codec = Codec::new(decl.serialization, decl.default_payload);
        if let Some(existing) = self.edge_types.iter().find(|e| e.joins(decl.lhs, decl.rhs)) {
            if existing.codec == codec {
                return Ok(self);
            }
            return Err(SchemaError::ConflictingEdgeType {
                lhs: decl.lhs,
                rhs: decl.rhs,
                reason: format!("declared as {} then as {codec}", existing.codec),
            });
        }

        self.edge_types.push(EdgeType {
            lhs: decl.lhs,
            rhs: decl.rhs,
            codec,
        });
        Ok(self)
    }

    /// Freeze the registry and build the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaFrozen`] if the registry was already
    /// finalized.
    pub fn finalize(&mut self) -> Result<Schema, SchemaError> {
        self.ensure_open("schema")?;
        self.frozen = true;
        debug!(
            "Schema finalized with {} vertex types and {} edge types",
            self.vertex_types.len(),
            self.edge_types.len()
        );
        Ok(Schema::build(
            std::mem::take(&mut self.vertex_types),
            std::mem::take(&mut self.edge_types),
        ))
    }

    /// Whether [`finalize`](Self::finalize) already ran.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

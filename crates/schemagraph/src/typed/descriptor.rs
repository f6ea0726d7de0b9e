//! Per-type descriptors parameterizing the generic vertex wrapper.

use crate::schema::{Codec, Schema};
use crate::store::TypeTag;
use std::collections::HashMap;

/// A vertex type reachable from another one, with the codec of the edges
/// joining them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    tag: TypeTag,
    name: String,
    plural: String,
    codec: Codec,
}

impl Connection {
    /// Tag of the connected vertex type.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Singular name of the connected type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plural label of the connected type, naming the neighbor accessor.
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Codec of the edge payloads.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }
}

/// Everything a [`TypedVertex`](super::TypedVertex) needs to know about its
/// type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDescriptor {
    tag: TypeTag,
    name: String,
    plural: String,
    codec: Codec,
    connections: Vec<Connection>,
}

impl VertexDescriptor {
    /// Vertex type tag.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Singular type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plural label naming the collection.
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Payload codec.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Connectable types, in schema declaration order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connection toward type `tag`.
    pub fn connection(&self, tag: TypeTag) -> Option<&Connection> {
        self.connections.iter().find(|c| c.tag == tag)
    }

    /// Connection named by the singular name of the other type, as in
    /// `add_<name>` and `discard_<name>`.
    pub fn connection_by_name(&self, name: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.name == name)
    }

    /// Connection named by the plural label of the other type, as in the
    /// `<plural>` neighbor accessor.
    pub fn connection_by_plural(&self, plural: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.plural == plural)
    }

    /// Names of the accessors derived from the connections:
    /// `add_<name>`, `discard_<name>` and `<plural>` for each of them.
    pub fn accessors(&self) -> Vec<String> {
        self.connections
            .iter()
            .flat_map(|c| {
                [
                    format!("add_{}", c.name),
                    format!("discard_{}", c.name),
                    c.plural.clone(),
                ]
            })
            .collect()
    }
}

/// Builds the [`VertexDescriptor`] of every type of a schema, once.
#[derive(Debug, Clone)]
pub struct TypedVertexFactory {
    descriptors: Vec<VertexDescriptor>,
    by_tag: HashMap<TypeTag, usize>,
}

impl TypedVertexFactory {
    /// Derive descriptors from a finalized schema.
    pub fn new(schema: &Schema) -> Self {
        let descriptors: Vec<VertexDescriptor> = schema
            .vertex_types()
            .iter()
            .map(|vertex_type| {
                let connections = schema
                    .connectable(vertex_type.tag())
                    .iter()
                    .filter_map(|other| {
                        let other_type = schema.vertex_type(*other)?;
                        let codec = schema
                            .dispatcher()
                            .pair_codec(vertex_type.tag(), *other)
                            .ok()?;
                        Some(Connection {
                            tag: *other,
                            name: other_type.name().to_string(),
                            plural: other_type.plural().to_string(),
                            codec: *codec,
                        })
                    })
                    .collect();
                VertexDescriptor {
                    tag: vertex_type.tag(),
                    name: vertex_type.name().to_string(),
                    plural: vertex_type.plural().to_string(),
                    codec: *vertex_type.codec(),
                    connections,
                }
            })
            .collect();
        let by_tag = descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (descriptor.tag, index))
            .collect();
        Self {
            descriptors,
            by_tag,
        }
    }

    /// Descriptors in schema declaration order.
    pub fn descriptors(&self) -> &[VertexDescriptor] {
        &self.descriptors
    }

    /// Descriptor of type `tag`.
    pub fn descriptor(&self, tag: TypeTag) -> Option<&VertexDescriptor> {
        self.by_tag.get(&tag).map(|index| &self.descriptors[*index])
    }

    /// Descriptor of the type with the given plural label.
    pub fn descriptor_by_plural(&self, plural: &str) -> Option<&VertexDescriptor> {
        self.descriptors.iter().find(|d| d.plural == plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EdgeTypeDecl, SchemaRegistry, Serialization, VertexTypeDecl};

    const PERSON: TypeTag = 1;
    const SKILL: TypeTag = 2;
    const CITY: TypeTag = 3;

    fn factory() -> TypedVertexFactory {
        let mut registry = SchemaRegistry::new();
        registry
            .register_vertex_type(VertexTypeDecl::new("person", PERSON, Serialization::Generic))
            .unwrap()
            .register_vertex_type(VertexTypeDecl::new("skill", SKILL, Serialization::Generic))
            .unwrap()
            .register_vertex_type(
                VertexTypeDecl::new("city", CITY, Serialization::Raw).with_plural("cities"),
            )
            .unwrap()
            .register_edge_type(EdgeTypeDecl::new(PERSON, SKILL))
            .unwrap()
            .register_edge_type(
                EdgeTypeDecl::new(CITY, PERSON).with_serialization(Serialization::Generic),
            )
            .unwrap();
        TypedVertexFactory::new(&registry.finalize().unwrap())
    }

    #[test]
    fn test_descriptor_per_type() {
        let factory = factory();
        let plurals: Vec<_> = factory.descriptors().iter().map(|d| d.plural()).collect();
        assert_eq!(plurals, vec!["persons", "skills", "cities"]);
        assert_eq!(factory.descriptor_by_plural("cities").unwrap().tag(), CITY);
        assert!(factory.descriptor(42).is_none());
    }

    #[test]
    fn test_connections_carry_pair_codec() {
        let factory = factory();
        let person = factory.descriptor(PERSON).unwrap();
        let tags: Vec<_> = person.connections().iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec![SKILL, CITY]);

        let city = person.connection_by_plural("cities").unwrap();
        assert_eq!(city.codec().serialization(), Serialization::Generic);
        assert_eq!(
            factory.descriptor(CITY).unwrap().connection(PERSON).unwrap().codec(),
            city.codec()
        );
        assert!(person.connection_by_name("skill").is_some());
        assert!(person.connection_by_name("person").is_none());
    }

    #[test]
    fn test_accessor_names() {
        let factory = factory();
        assert_eq!(
            factory.descriptor(SKILL).unwrap().accessors(),
            vec!["add_person", "discard_person", "persons"]
        );
    }
}

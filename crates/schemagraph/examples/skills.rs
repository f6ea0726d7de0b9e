//! Skills example for schemagraph
//!
//! This example demonstrates:
//! - Declaring vertex and edge types
//! - Adding typed vertices and edges
//! - Walking neighbors through named accessors

use schemagraph::{
    EdgeTypeDecl, Payload, SchemaGraph, SchemaRegistry, Serialization, VertexTypeDecl,
};
use serde_json::json;
use std::sync::Arc;

const PERSON: i32 = 1;
const SKILL: i32 = 2;

fn main() -> schemagraph::Result<()> {
    let mut registry = SchemaRegistry::new();
    registry
        .register_vertex_type(VertexTypeDecl::new("person", PERSON, Serialization::Generic))?
        .register_vertex_type(VertexTypeDecl::new("skill", SKILL, Serialization::Generic))?
        .register_edge_type(
            EdgeTypeDecl::new(PERSON, SKILL).with_serialization(Serialization::Generic),
        )?;
    let schema = Arc::new(registry.finalize()?);

    // Use SchemaGraph::open(schema, path) for a persistent graph
    let graph = SchemaGraph::in_memory(schema);

    println!("Collections:");
    for collection in graph.collections() {
        println!(
            "  {} (tag {}): {}",
            collection.plural(),
            collection.vertex_type(),
            collection.descriptor().accessors().join(", ")
        );
    }

    let persons = graph.collection("persons").expect("persons are declared");
    let skills = graph.collection("skills").expect("skills are declared");

    let alice = persons.add(0, Payload::from(json!({"name": "Alice"})))?;
    let bob = persons.add(1, Payload::from(json!({"name": "Bob"})))?;
    skills.add_bulk(
        &[10, 11, 12],
        Some(vec![
            Payload::from("Rust"),
            Payload::from("C++"),
            Payload::from("Python"),
        ]),
    )?;
    println!("\n✓ Added {} persons and {} skills", persons.len()?, skills.len()?);

    alice
        .add_named("skill", 10, Payload::from(json!({"level": 5})))?
        .add_named("skill", 11, Payload::from(json!({"level": 3})))?;
    bob.add_named("skill", 12, None)?;
    println!("✓ Connected persons to skills");

    println!("\nSkills per person:");
    for person in persons.iter()? {
        let name = person
            .data()?
            .and_then(|data| data.as_value())
            .and_then(|value| value.get("name"))
            .and_then(|name| name.as_str())
            .unwrap_or("?")
            .to_string();
        for skill in person.neighbors_named("skills")? {
            let level = person.edge_data(&skill)?;
            println!(
                "  {name} knows {} ({level:?})",
                skill.data()?.and_then(Payload::as_str).unwrap_or("?")
            );
        }
    }

    skills.discard(11)?;
    println!(
        "\n✓ Discarded C++, Alice now knows {} skill(s)",
        alice.neighbors(SKILL)?.len()
    );

    println!("\nStatistics:\n{}", graph.statistics()?);
    Ok(())
}

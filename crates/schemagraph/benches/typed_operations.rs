use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use schemagraph::{
    EdgeTypeDecl, LocalId, Payload, SchemaGraph, SchemaRegistry, Serialization, VertexTypeDecl,
};
use std::sync::Arc;
use tempfile::TempDir;

const PERSON: i32 = 1;
const SKILL: i32 = 2;

fn schema() -> Arc<schemagraph::Schema> {
    let mut registry = SchemaRegistry::new();
    registry
        .register_vertex_type(VertexTypeDecl::new("person", PERSON, Serialization::Generic))
        .unwrap()
        .register_vertex_type(VertexTypeDecl::new("skill", SKILL, Serialization::Raw))
        .unwrap()
        .register_edge_type(EdgeTypeDecl::new(PERSON, SKILL))
        .unwrap();
    Arc::new(registry.finalize().unwrap())
}

fn bench_vertex_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_insert");

    for size in [100, 1000, 10_000].iter() {
        let ids: Vec<LocalId> = (0..*size).collect();

        group.bench_with_input(BenchmarkId::new("one_by_one", size), size, |b, _| {
            b.iter_with_setup(
                || {
                    let temp_dir = TempDir::new().unwrap();
                    let graph = SchemaGraph::open(schema(), temp_dir.path().join("bench.db")).unwrap();
                    (graph, temp_dir)
                },
                |(graph, _temp_dir)| {
                    let skills = graph.vertices_of(SKILL).unwrap();
                    for id in &ids {
                        black_box(skills.add(*id, None).unwrap());
                    }
                },
            );
        });

        group.bench_with_input(BenchmarkId::new("bulk", size), size, |b, _| {
            b.iter_with_setup(
                || {
                    let temp_dir = TempDir::new().unwrap();
                    let graph = SchemaGraph::open(schema(), temp_dir.path().join("bench.db")).unwrap();
                    (graph, temp_dir)
                },
                |(graph, _temp_dir)| {
                    let skills = graph.vertices_of(SKILL).unwrap();
                    skills.add_bulk(&ids, None).unwrap();
                },
            );
        });
    }

    group.finish();
}

fn bench_payload_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_lookup");

    for size in [1000, 10_000].iter() {
        let temp_dir = TempDir::new().unwrap();
        let graph = SchemaGraph::open(schema(), temp_dir.path().join("bench.db")).unwrap();
        let persons = graph.vertices_of(PERSON).unwrap();
        for id in 0..*size {
            persons
                .add(id, Payload::from(format!("person_{id}")))
                .unwrap();
        }

        group.bench_with_input(BenchmarkId::new("get", size), size, |b, &size| {
            b.iter(|| {
                black_box(persons.get(size / 2).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_neighbor_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_iteration");

    let temp_dir = TempDir::new().unwrap();
    let graph = SchemaGraph::open(schema(), temp_dir.path().join("bench.db")).unwrap();
    let alice = graph.vertices_of(PERSON).unwrap().add(0, None).unwrap();

    let mut connected = 0;
    for num_neighbors in [10u64, 100, 1000].iter() {
        let ids: Vec<LocalId> = (connected..*num_neighbors).collect();
        alice.connect_bulk(SKILL, &ids, true).unwrap();
        connected = *num_neighbors;

        group.bench_with_input(
            BenchmarkId::new("neighbors", num_neighbors),
            num_neighbors,
            |b, _| {
                b.iter(|| {
                    black_box(alice.neighbors(SKILL).unwrap().count());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_vertex_insert,
    bench_payload_lookup,
    bench_neighbor_iteration
);
criterion_main!(benches);

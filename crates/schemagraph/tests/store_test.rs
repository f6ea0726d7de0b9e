//! Low-level store behavior on the in-memory and RocksDB backends.

#![cfg(feature = "rocksdb-backend")]

use schemagraph::{make_id, Graph, GraphStore, StoreConfig, StoreError, VertexId, WriteOptions};
use tempfile::TempDir;

const A: VertexId = make_id(0, 1);
const B: VertexId = make_id(0, 2);
const C: VertexId = make_id(0, 3);
const D: VertexId = make_id(0, 4);

fn square(graph: &dyn GraphStore) {
    for vertex in [A, B, C, D] {
        graph
            .insert_vertex(vertex, None, WriteOptions::default())
            .unwrap();
    }
    for (lhs, rhs) in [(A, B), (B, C), (C, D), (D, A)] {
        graph
            .insert_edge(lhs, rhs, None, WriteOptions::default())
            .unwrap();
    }
}

fn check_cascading_removal(graph: &dyn GraphStore) {
    square(graph);
    assert_eq!(graph.count_edges().unwrap(), 4);

    graph.discard_vertex(A, WriteOptions::commit()).unwrap();

    assert!(!graph.contains_vertex(A).unwrap());
    assert_eq!(graph.neighbors(A, None).unwrap(), vec![]);
    assert_eq!(graph.neighbors(B, None).unwrap(), vec![C]);
    assert_eq!(graph.neighbors(C, None).unwrap(), vec![B, D]);
    assert_eq!(graph.neighbors(D, None).unwrap(), vec![C]);
    assert_eq!(graph.count_edges().unwrap(), 2);
    assert_eq!(graph.count_vertices().unwrap(), 3);
}

#[test]
fn test_cascading_removal_in_memory() {
    check_cascading_removal(&Graph::in_memory());
}

#[test]
fn test_cascading_removal_rocksdb() {
    let temp_dir = TempDir::new().unwrap();
    let graph = Graph::open(temp_dir.path().join("square.db")).unwrap();
    check_cascading_removal(&graph);
}

#[test]
fn test_edge_payload_roundtrip_rocksdb() {
    let temp_dir = TempDir::new().unwrap();
    let graph = Graph::open(temp_dir.path().join("edges.db")).unwrap();
    square(&graph);

    graph
        .insert_edge(B, D, Some(b"diagonal".as_slice()), WriteOptions::default())
        .unwrap();
    assert_eq!(graph.get_edge(D, B).unwrap(), Some(b"diagonal".to_vec()));
    assert_eq!(graph.get_edge(A, C).unwrap(), None);
    assert_eq!(graph.neighbors(B, Some(0)).unwrap(), vec![A, C, D]);
    assert_eq!(graph.neighbors(B, Some(1)).unwrap(), vec![]);
}

#[test]
fn test_persistence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("persist.db");

    {
        let graph = Graph::open(&path).unwrap();
        square(&graph);
        graph
            .insert_vertex(make_id(7, 99), Some(b"payload".as_slice()), WriteOptions::commit())
            .unwrap();
        graph.commit().unwrap();
    }

    let graph = Graph::open(&path).unwrap();
    assert_eq!(graph.count_vertices().unwrap(), 5);
    assert_eq!(graph.count_vertices_of(0).unwrap(), 4);
    assert_eq!(graph.count_edges().unwrap(), 4);
    assert_eq!(
        graph.get_vertex(make_id(7, 99)).unwrap(),
        Some(b"payload".to_vec())
    );
    assert_eq!(graph.vertices_of(7).unwrap(), vec![make_id(7, 99)]);
}

#[test]
fn test_read_only_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("frozen.db");

    {
        let graph = Graph::open(&path).unwrap();
        square(&graph);
        graph.commit().unwrap();
    }
    StoreConfig::default()
        .with_read_only(true)
        .write(&path)
        .unwrap();

    let graph = Graph::open(&path).unwrap();
    assert!(graph.config().read_only);
    assert_eq!(graph.count_vertices().unwrap(), 4);

    let err = graph
        .insert_vertex(make_id(0, 5), None, WriteOptions::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly { .. }));
    assert!(matches!(
        graph.discard_vertex(A, WriteOptions::default()),
        Err(StoreError::ReadOnly { .. })
    ));
    assert!(graph.contains_vertex(A).unwrap());
}

#[test]
fn test_statistics_without_backend_metrics() {
    let temp_dir = TempDir::new().unwrap();
    let graph = Graph::open_with_config(
        temp_dir.path().join("stats.db"),
        StoreConfig::default().with_statistics(false),
    )
    .unwrap();
    square(&graph);

    let stats = graph.statistics().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats.to_string(), "edges 4\nvertices 4\n");
}

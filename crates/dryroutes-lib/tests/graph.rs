mod common;

use common::{edge, node, triangle_edges, triangle_nodes};
use dryroutes_lib::{build_graph, Coordinates, Error, NodeId};

#[test]
fn builds_adjacency_in_dataset_order() {
    let graph = build_graph(triangle_nodes(), triangle_edges()).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 3);
    let targets: Vec<_> = graph
        .neighbours(&NodeId::from("A"))
        .iter()
        .map(|edge| edge.target.clone())
        .collect();
    assert_eq!(targets, vec![NodeId::from("B"), NodeId::from("C")]);
    assert!(graph.neighbours(&NodeId::from("C")).is_empty());
    assert!(graph.edge(&NodeId::from("C"), &NodeId::from("A")).is_none());
}

#[test]
fn coordinates_are_available_by_id() {
    let graph = build_graph(triangle_nodes(), triangle_edges()).unwrap();

    assert_eq!(
        graph.coordinates(&NodeId::from("B")),
        Some(Coordinates { x: 1.0, y: 0.0 })
    );
    assert_eq!(graph.coordinates(&NodeId::from("Z")), None);
}

#[test]
fn building_twice_yields_identical_graphs() {
    let first = build_graph(triangle_nodes(), triangle_edges()).unwrap();
    let second = build_graph(triangle_nodes(), triangle_edges()).unwrap();

    assert_eq!(first.stats(), second.stats());
    assert_eq!(first.node_ids(), second.node_ids());
    for id in first.node_ids() {
        assert_eq!(first.node(id), second.node(id));
        assert_eq!(first.neighbours(id), second.neighbours(id));
    }
}

#[test]
fn dangling_destination_fails_the_build() {
    let mut edges = triangle_edges();
    edges.push(edge("C", "D", 1.0, 1.0, 1.0));

    let error = build_graph(triangle_nodes(), edges).expect_err("D is not a node");
    match &error {
        Error::DanglingEdge {
            index,
            origin,
            destination,
            missing,
        } => {
            assert_eq!(*index, 3);
            assert_eq!(origin, &NodeId::from("C"));
            assert_eq!(destination, &NodeId::from("D"));
            assert_eq!(missing, &NodeId::from("D"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.is_load_error());
}

#[test]
fn node_ids_are_listed_in_natural_order() {
    let graph = build_graph(
        vec![node("b", 0.0, 0.0), node("a", 0.0, 0.0), node("c", 0.0, 0.0)],
        Vec::new(),
    )
    .unwrap();

    let listed: Vec<String> = graph.node_ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(listed, vec!["a", "b", "c"]);
}

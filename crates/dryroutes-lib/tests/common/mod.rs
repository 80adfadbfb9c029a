#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use dryroutes_lib::{EdgeRecord, NodeId, NodeRecord};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

pub fn node(id: &str, x: f64, y: f64) -> NodeRecord {
    NodeRecord {
        id: NodeId::from(id),
        x,
        y,
        altura: None,
        peligrosidad: None,
    }
}

pub fn edge(from: &str, to: &str, costo_total: f64, tiempo: f64, distancia: f64) -> EdgeRecord {
    EdgeRecord {
        origen: NodeId::from(from),
        destino: NodeId::from(to),
        costo_total,
        tiempo,
        distancia,
        altura_media: 0.0,
    }
}

/// Three collinear nodes where the cheap route and the fast route differ.
pub fn triangle_nodes() -> Vec<NodeRecord> {
    vec![
        node("A", 0.0, 0.0),
        node("B", 1.0, 0.0),
        node("C", 2.0, 0.0),
    ]
}

pub fn triangle_edges() -> Vec<EdgeRecord> {
    vec![
        edge("A", "B", 5.0, 2.0, 100.0),
        edge("B", "C", 5.0, 2.0, 100.0),
        edge("A", "C", 20.0, 1.0, 150.0),
    ]
}

pub fn gzip_json<T: Serialize>(records: &[T]) -> Vec<u8> {
    let json = serde_json::to_vec(records).expect("serialise records");
    gzip_bytes(&json)
}

pub fn gzip_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("compress payload");
    encoder.finish().expect("finish gzip stream")
}

/// Write gzip payloads for `nodes` and `edges` into `dir`.
pub fn write_dataset(dir: &Path, nodes: &[NodeRecord], edges: &[EdgeRecord]) -> (PathBuf, PathBuf) {
    let nodes_path = dir.join("nodos.json.gz");
    let edges_path = dir.join("aristas.json.gz");
    std::fs::write(&nodes_path, gzip_json(nodes)).expect("write nodes fixture");
    std::fs::write(&edges_path, gzip_json(edges)).expect("write edges fixture");
    (nodes_path, edges_path)
}

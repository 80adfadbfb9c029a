use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dataset::{EdgeRecord, NodeRecord};
use crate::error::{Error, Result};

/// Minimum Jaro-Winkler similarity for an id to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Stable identifier for a node in the road network.
///
/// Datasets use either integer or string ids. The derived ordering places
/// every integer id before every string id, which is the order the route
/// engine uses to break ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(value) => write!(f, "{value}"),
            NodeId::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Int(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Text(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId::Text(value)
    }
}

/// Planar or geographic position of a node (`x` is the longitude when the
/// dataset is geographic).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Point of the road network with its flood-risk attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coordinates: Coordinates,
    pub altura: Option<f64>,
    pub peligrosidad: Option<f64>,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            coordinates: Coordinates {
                x: record.x,
                y: record.y,
            },
            altura: record.altura,
            peligrosidad: record.peligrosidad,
        }
    }
}

/// Directed edge stored in the adjacency list of its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub costo_total: f64,
    pub tiempo: f64,
    pub distancia: f64,
    pub altura_media: f64,
}

/// Node and edge counts of a loaded graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
}

/// Directed road graph used by the route engine.
///
/// Built once by [`build_graph`] and read-only afterwards, so a single
/// instance can serve concurrent routing requests.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    adjacency: HashMap<NodeId, Vec<Edge>>,
    /// Origin -> target -> position in the origin's adjacency list.
    edge_index: HashMap<NodeId, HashMap<NodeId, usize>>,
    edge_count: usize,
}

impl Graph {
    /// Lookup a node by identifier.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Coordinates of a node, used to place route endpoints even when no
    /// path exists between them.
    pub fn coordinates(&self, id: &NodeId) -> Option<Coordinates> {
        self.nodes.get(id).map(|node| node.coordinates)
    }

    /// Outgoing edges of `id` in dataset order. Unknown ids yield an empty
    /// slice.
    pub fn neighbours(&self, id: &NodeId) -> &[Edge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The edge `from -> to`, if present.
    pub fn edge(&self, from: &NodeId, to: &NodeId) -> Option<&Edge> {
        let position = *self.edge_index.get(from)?.get(to)?;
        self.adjacency.get(from)?.get(position)
    }

    /// Every edge with its origin, origins in natural id order and each
    /// origin's edges in adjacency order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &Edge)> + '_ {
        self.node_ids().into_iter().flat_map(move |origin| {
            let edges = self.neighbours(origin);
            edges.iter().map(move |edge| (origin, edge))
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
        }
    }

    /// All node identifiers in their natural order.
    pub fn node_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve user-supplied text to a node id, trying the integer reading
    /// first and the textual one second.
    ///
    /// Input wrapped in double quotes (`"7"`) only matches a text id, which
    /// reaches a text node whose id collides with an integer id.
    pub fn resolve_node(&self, input: &str) -> Option<NodeId> {
        let trimmed = input.trim();
        if let Some(quoted) = trimmed.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            let candidate = NodeId::Text(quoted.to_string());
            return self.contains(&candidate).then_some(candidate);
        }

        let text = NodeId::Text(trimmed.to_string());
        if let Ok(value) = trimmed.parse::<i64>() {
            let candidate = NodeId::Int(value);
            if self.contains(&candidate) {
                if self.contains(&text) {
                    warn!(
                        id = trimmed,
                        "input matches both an integer and a text id; using the integer id \
                         (quote the input to select the text id)"
                    );
                }
                return Some(candidate);
            }
        }

        self.contains(&text).then_some(text)
    }

    /// Node ids that look similar to `input`, best match first.
    pub fn suggest_nodes(&self, input: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(f64, String)> = self
            .nodes
            .keys()
            .map(|id| {
                let text = id.to_string();
                (strsim::jaro_winkler(input, &text), text)
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scored.truncate(limit);
        scored.into_iter().map(|(_, text)| text).collect()
    }
}

/// Build the routing graph from decoded node and edge records.
///
/// Repeated node ids and repeated `(origen, destino)` pairs keep the
/// attributes of the last record. A repeated edge stays at the adjacency
/// position of its first occurrence. Every edge endpoint must exist in the
/// node set, otherwise [`Error::DanglingEdge`] is returned.
pub fn build_graph(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Result<Graph> {
    let mut node_map: HashMap<NodeId, Node> = HashMap::with_capacity(nodes.len());
    let mut replaced_nodes = 0usize;
    for record in nodes {
        let node = Node::from(record);
        if node_map.insert(node.id.clone(), node).is_some() {
            replaced_nodes += 1;
        }
    }

    // Every node gets an entry, including those without outgoing edges.
    let mut adjacency: HashMap<NodeId, Vec<Edge>> = node_map
        .keys()
        .map(|id| (id.clone(), Vec::new()))
        .collect();

    let mut edge_index: HashMap<NodeId, HashMap<NodeId, usize>> = HashMap::new();
    let mut edge_count = 0usize;
    let mut replaced_edges = 0usize;
    for (index, record) in edges.into_iter().enumerate() {
        let EdgeRecord {
            origen,
            destino,
            costo_total,
            tiempo,
            distancia,
            altura_media,
        } = record;

        for endpoint in [&origen, &destino] {
            if !node_map.contains_key(endpoint) {
                return Err(Error::DanglingEdge {
                    index,
                    missing: endpoint.clone(),
                    origin: origen.clone(),
                    destination: destino.clone(),
                });
            }
        }

        let edge = Edge {
            target: destino,
            costo_total,
            tiempo,
            distancia,
            altura_media,
        };
        let outgoing = adjacency.entry(origen.clone()).or_default();
        let positions = edge_index.entry(origen).or_default();
        match positions.get(&edge.target) {
            Some(&position) => {
                outgoing[position] = edge;
                replaced_edges += 1;
            }
            None => {
                positions.insert(edge.target.clone(), outgoing.len());
                outgoing.push(edge);
                edge_count += 1;
            }
        }
    }

    if replaced_nodes > 0 || replaced_edges > 0 {
        warn!(
            replaced_nodes,
            replaced_edges,
            "duplicate records replaced earlier ones (last write wins)"
        );
    }
    info!(
        nodes = node_map.len(),
        edges = edge_count,
        "built road graph"
    );

    Ok(Graph {
        nodes: node_map,
        adjacency,
        edge_index,
        edge_count,
    })
}

//! Shortest-path computation over the road graph.
//!
//! Routes are computed with Dijkstra's algorithm over a binary-heap frontier.
//! Edge weights are non-negative (the decoder rejects anything else), so the
//! search can stop as soon as the target is popped. Frontier entries with
//! equal accumulated weight are popped in ascending [`NodeId`] order, which
//! makes the returned path reproducible and not only its total.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{EndpointRole, Error, Result};
use crate::graph::{Coordinates, Edge, Graph, NodeId};

/// Number of fuzzy suggestions attached to unknown-node errors.
const MAX_SUGGESTIONS: usize = 3;

/// Edge attribute minimised by a routing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteCriterion {
    /// Composite traversal cost including flood exposure.
    #[default]
    CostoTotal,
    /// Travel time in minutes.
    Tiempo,
}

impl RouteCriterion {
    /// Weight of `edge` under this criterion.
    pub fn weight(self, edge: &Edge) -> f64 {
        match self {
            RouteCriterion::CostoTotal => edge.costo_total,
            RouteCriterion::Tiempo => edge.tiempo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteCriterion::CostoTotal => "costo_total",
            RouteCriterion::Tiempo => "tiempo",
        }
    }
}

impl fmt::Display for RouteCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteCriterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "costo_total" => Ok(RouteCriterion::CostoTotal),
            "tiempo" => Ok(RouteCriterion::Tiempo),
            other => Err(Error::Configuration {
                value: other.to_string(),
            }),
        }
    }
}

/// Path found by the route engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub criterion: RouteCriterion,
    /// Node ids from source to target, both inclusive.
    pub path: Vec<NodeId>,
    /// Sum of the optimised attribute along the path.
    pub total_weight: f64,
    /// Sum of `distancia` along the path (metres).
    pub total_distance: f64,
    /// Sum of `tiempo` along the path (minutes).
    pub total_time: f64,
}

impl RouteResult {
    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Coordinates of every node on the path, in path order.
    pub fn coordinates(&self, graph: &Graph) -> Vec<Coordinates> {
        self.path
            .iter()
            .filter_map(|id| graph.coordinates(id))
            .collect()
    }
}

/// Both endpoints of a request for which no directed path exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unreachable {
    pub criterion: RouteCriterion,
    pub source: NodeId,
    pub target: NodeId,
    pub source_coordinates: Coordinates,
    pub target_coordinates: Coordinates,
}

/// Outcome of a routing request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(RouteResult),
    NoPath(Unreachable),
}

impl RouteOutcome {
    pub fn found(&self) -> Option<&RouteResult> {
        match self {
            RouteOutcome::Found(result) => Some(result),
            RouteOutcome::NoPath(_) => None,
        }
    }

    pub fn is_no_path(&self) -> bool {
        matches!(self, RouteOutcome::NoPath(_))
    }

    /// Node ids of the path; empty when no path exists.
    pub fn path(&self) -> &[NodeId] {
        match self {
            RouteOutcome::Found(result) => &result.path,
            RouteOutcome::NoPath(_) => &[],
        }
    }
}

/// Route between two nodes given as text, with the criterion given by name.
///
/// The criterion is validated first, then both endpoints are resolved
/// against the graph (unknown ids carry similar-id suggestions). No search
/// runs unless all three inputs are valid.
pub fn route(graph: &Graph, source: &str, target: &str, criterion: &str) -> Result<RouteOutcome> {
    let criterion = criterion.parse::<RouteCriterion>()?;
    let source = resolve_endpoint(graph, source, EndpointRole::Source)?;
    let target = resolve_endpoint(graph, target, EndpointRole::Target)?;
    shortest_path(graph, &source, &target, criterion)
}

fn resolve_endpoint(graph: &Graph, input: &str, role: EndpointRole) -> Result<NodeId> {
    graph.resolve_node(input).ok_or_else(|| Error::UnknownNode {
        role,
        id: input.to_string(),
        suggestions: graph.suggest_nodes(input, MAX_SUGGESTIONS),
    })
}

/// Compute the minimum-weight directed path from `source` to `target`.
///
/// Returns [`RouteOutcome::NoPath`] when the target cannot be reached, and
/// [`Error::UnknownNode`] when either endpoint is not part of the graph.
pub fn shortest_path(
    graph: &Graph,
    source: &NodeId,
    target: &NodeId,
    criterion: RouteCriterion,
) -> Result<RouteOutcome> {
    let source_coordinates = endpoint_coordinates(graph, source, EndpointRole::Source)?;
    let target_coordinates = endpoint_coordinates(graph, target, EndpointRole::Target)?;

    let Some(path) = find_path(graph, source, target, criterion) else {
        debug!(%source, %target, %criterion, "target unreachable from source");
        return Ok(RouteOutcome::NoPath(Unreachable {
            criterion,
            source: source.clone(),
            target: target.clone(),
            source_coordinates,
            target_coordinates,
        }));
    };

    let (mut total_weight, mut total_distance, mut total_time) = (0.0, 0.0, 0.0);
    for pair in path.windows(2) {
        if let Some(edge) = graph.edge(pair[0], pair[1]) {
            total_weight += criterion.weight(edge);
            total_distance += edge.distancia;
            total_time += edge.tiempo;
        }
    }

    Ok(RouteOutcome::Found(RouteResult {
        criterion,
        path: path.into_iter().cloned().collect(),
        total_weight,
        total_distance,
        total_time,
    }))
}

fn endpoint_coordinates(graph: &Graph, id: &NodeId, role: EndpointRole) -> Result<Coordinates> {
    graph.coordinates(id).ok_or_else(|| {
        let text = id.to_string();
        Error::UnknownNode {
            role,
            suggestions: graph.suggest_nodes(&text, MAX_SUGGESTIONS),
            id: text,
        }
    })
}

fn find_path<'g>(
    graph: &'g Graph,
    source: &'g NodeId,
    target: &'g NodeId,
    criterion: RouteCriterion,
) -> Option<Vec<&'g NodeId>> {
    if source == target {
        return Some(vec![source]);
    }

    let mut distances: HashMap<&NodeId, f64> = HashMap::new();
    let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
    let mut settled: HashSet<&NodeId> = HashSet::new();
    let mut queue = BinaryHeap::new();

    distances.insert(source, 0.0);
    queue.push(QueueEntry::new(source, 0.0));

    while let Some(entry) = queue.pop() {
        if !settled.insert(entry.node) {
            continue;
        }

        if entry.node == target {
            debug!(settled = settled.len(), "route target settled");
            return Some(reconstruct_path(&parents, source, target));
        }

        let current = entry.cost.0;
        for edge in graph.neighbours(entry.node) {
            let next = &edge.target;
            if settled.contains(next) {
                continue;
            }

            let next_cost = current + criterion.weight(edge);
            let improved = match distances.entry(next) {
                Entry::Vacant(slot) => {
                    slot.insert(next_cost);
                    true
                }
                Entry::Occupied(mut slot) if next_cost < *slot.get() => {
                    slot.insert(next_cost);
                    true
                }
                Entry::Occupied(_) => false,
            };

            if improved {
                parents.insert(next, entry.node);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    None
}

fn reconstruct_path<'g>(
    parents: &HashMap<&'g NodeId, &'g NodeId>,
    source: &'g NodeId,
    target: &'g NodeId,
) -> Vec<&'g NodeId> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match parents.get(current) {
            Some(parent) => {
                path.push(*parent);
                current = *parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct QueueEntry<'g> {
    node: &'g NodeId,
    cost: FloatOrd,
}

impl<'g> QueueEntry<'g> {
    fn new(node: &'g NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then id.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

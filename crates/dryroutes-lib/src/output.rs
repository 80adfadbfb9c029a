use std::fmt::Write;

use serde::Serialize;

use crate::graph::{Coordinates, Graph, GraphStats, NodeId};
use crate::routing::{RouteCriterion, RouteOutcome};
use crate::source::DatasetSources;

/// Whether a route summary describes a path or an unreachable target.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Found,
    NoPath,
}

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
}

/// Endpoint of a routing request with its location.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEndpoint {
    pub id: NodeId,
    #[serde(flatten)]
    pub coordinates: Coordinates,
}

/// Node visited along a route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub id: NodeId,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altura: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peligrosidad: Option<f64>,
}

/// Structured representation of a routing outcome that presenters can
/// serialise or render.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub status: RouteStatus,
    pub criterion: RouteCriterion,
    pub start: RouteEndpoint,
    pub goal: RouteEndpoint,
    pub hops: usize,
    /// Metres.
    pub total_distance: f64,
    /// Minutes.
    pub total_time: f64,
    pub total_weight: f64,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Attach node attributes from `graph` to a routing outcome.
    ///
    /// Returns `None` only if the outcome references nodes missing from
    /// `graph`, i.e. it was computed against a different graph.
    pub fn from_outcome(graph: &Graph, outcome: &RouteOutcome) -> Option<Self> {
        match outcome {
            RouteOutcome::Found(result) => {
                let steps = result
                    .path
                    .iter()
                    .enumerate()
                    .map(|(index, id)| {
                        graph.node(id).map(|node| RouteStep {
                            index,
                            id: id.clone(),
                            coordinates: node.coordinates,
                            altura: node.altura,
                            peligrosidad: node.peligrosidad,
                        })
                    })
                    .collect::<Option<Vec<_>>>()?;

                let first = steps.first()?;
                let last = steps.last()?;
                Some(Self {
                    status: RouteStatus::Found,
                    criterion: result.criterion,
                    start: RouteEndpoint {
                        id: first.id.clone(),
                        coordinates: first.coordinates,
                    },
                    goal: RouteEndpoint {
                        id: last.id.clone(),
                        coordinates: last.coordinates,
                    },
                    hops: result.hop_count(),
                    total_distance: result.total_distance,
                    total_time: result.total_time,
                    total_weight: result.total_weight,
                    steps,
                })
            }
            RouteOutcome::NoPath(unreachable) => Some(Self {
                status: RouteStatus::NoPath,
                criterion: unreachable.criterion,
                start: RouteEndpoint {
                    id: unreachable.source.clone(),
                    coordinates: unreachable.source_coordinates,
                },
                goal: RouteEndpoint {
                    id: unreachable.target.clone(),
                    coordinates: unreachable.target_coordinates,
                },
                hops: 0,
                total_distance: 0.0,
                total_time: 0.0,
                total_weight: 0.0,
                steps: Vec::new(),
            }),
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        match self.status {
            RouteStatus::Found => {
                let _ = writeln!(
                    buffer,
                    "Route found with {} nodes: {} -> {} (minimising {})",
                    self.steps.len(),
                    self.start.id,
                    self.goal.id,
                    self.criterion
                );
                let _ = writeln!(buffer, "Total distance: {:.1} m", self.total_distance);
                let _ = writeln!(buffer, "Estimated time: {:.1} min", self.total_time);
                for step in &self.steps {
                    let _ = writeln!(
                        buffer,
                        "{:>4}: {} ({}, {})",
                        step.index, step.id, step.coordinates.y, step.coordinates.x
                    );
                }
            }
            RouteStatus::NoPath => {
                let _ = writeln!(
                    buffer,
                    "No route from {} to {} (minimising {})",
                    self.start.id, self.goal.id, self.criterion
                );
                write_endpoints(&mut buffer, &self.start, &self.goal);
            }
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        match self.status {
            RouteStatus::Found => {
                let _ = writeln!(
                    buffer,
                    "**Route** _{} -> {}_ ({} nodes, criterion: `{}`)",
                    self.start.id,
                    self.goal.id,
                    self.steps.len(),
                    self.criterion
                );
                let _ = writeln!(buffer, "* Total distance: `{:.1} m`", self.total_distance);
                let _ = writeln!(buffer, "* Estimated time: `{:.1} min`", self.total_time);
                for step in &self.steps {
                    let _ = writeln!(buffer, "* {:>2}. **{}**", step.index, step.id);
                }
            }
            RouteStatus::NoPath => {
                let _ = writeln!(
                    buffer,
                    "**No route** _{} -> {}_ (criterion: `{}`)",
                    self.start.id, self.goal.id, self.criterion
                );
                write_endpoints(&mut buffer, &self.start, &self.goal);
            }
        }
        buffer
    }
}

fn write_endpoints(buffer: &mut String, start: &RouteEndpoint, goal: &RouteEndpoint) {
    let _ = writeln!(
        buffer,
        "Origin {} at ({}, {})",
        start.id, start.coordinates.y, start.coordinates.x
    );
    let _ = writeln!(
        buffer,
        "Destination {} at ({}, {})",
        goal.id, goal.coordinates.y, goal.coordinates.x
    );
}

/// Size of a loaded graph together with where it came from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes_source: String,
    pub edges_source: String,
    #[serde(flatten)]
    pub stats: GraphStats,
}

impl GraphSummary {
    pub fn new(sources: &DatasetSources, graph: &Graph) -> Self {
        Self {
            nodes_source: sources.nodes.to_string(),
            edges_source: sources.edges.to_string(),
            stats: graph.stats(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Graph loaded with {} nodes and {} edges.\n",
            self.stats.nodes, self.stats.edges
        )
    }
}

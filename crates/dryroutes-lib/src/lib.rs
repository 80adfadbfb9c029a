//! DryRoutes library entry points.
//!
//! This crate decodes the compressed node/edge datasets of a flood-annotated
//! road network, builds the directed routing graph, and computes shortest
//! paths by total cost or travel time. Presenters (the CLI, or anything
//! else) should only depend on the functions exported here instead of
//! reimplementing behavior.
//!

pub mod cache;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod output;
pub mod routing;
pub mod source;

pub use cache::GraphCache;
pub use dataset::{
    decode_edges, decode_nodes, load_graph, load_graph_from_bytes, EdgeRecord, NodeRecord,
};
pub use error::{DatasetKind, EndpointRole, Error, Result};
pub use graph::{build_graph, Coordinates, Edge, Graph, GraphStats, Node, NodeId};
pub use output::{GraphSummary, RouteRenderMode, RouteStatus, RouteSummary};
pub use routing::{route, shortest_path, RouteCriterion, RouteOutcome, RouteResult, Unreachable};
pub use source::{
    resolve_fetch_timeout, DatasetFetcher, DatasetLocator, DatasetSources, HttpFetcher,
    DEFAULT_EDGES_URL, DEFAULT_NODES_URL,
};

//! Process-wide memoization of the loaded road graph.
//!
//! Decoding and building the graph dominates the cost of a request, so the
//! built graph is kept keyed by the full pair of dataset locators. The cache
//! holds one graph: asking for a different pair replaces it.

use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::dataset::load_graph;
use crate::error::Result;
use crate::graph::Graph;
use crate::source::{DatasetFetcher, DatasetSources};

static GLOBAL_CACHE: Lazy<GraphCache> = Lazy::new(GraphCache::new);

#[derive(Debug)]
struct CachedGraph {
    sources: DatasetSources,
    graph: Arc<Graph>,
}

/// Single-slot cache of the graph built from one [`DatasetSources`] pair.
#[derive(Debug, Default)]
pub struct GraphCache {
    slot: Mutex<Option<CachedGraph>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static GraphCache {
        &GLOBAL_CACHE
    }

    /// Return the graph for `sources`, loading it through `fetcher` when the
    /// cached graph was built from a different pair (or nothing is cached).
    ///
    /// A failed load leaves the previously cached graph in place.
    pub fn get_or_load(
        &self,
        sources: &DatasetSources,
        fetcher: &dyn DatasetFetcher,
    ) -> Result<Arc<Graph>> {
        let mut slot = self.lock();
        if let Some(cached) = slot.as_ref() {
            if cached.sources == *sources {
                debug!(nodes = %sources.nodes, edges = %sources.edges, "graph cache hit");
                return Ok(Arc::clone(&cached.graph));
            }
            info!(
                previous_nodes = %cached.sources.nodes,
                previous_edges = %cached.sources.edges,
                "dataset sources changed; rebuilding graph"
            );
        }

        let graph = Arc::new(load_graph(sources, fetcher)?);
        *slot = Some(CachedGraph {
            sources: sources.clone(),
            graph: Arc::clone(&graph),
        });
        Ok(graph)
    }

    /// Sources of the graph currently cached, if any.
    pub fn cached_sources(&self) -> Option<DatasetSources> {
        self.lock().as_ref().map(|cached| cached.sources.clone())
    }

    /// Drop the cached graph. Callers still holding an `Arc` keep their copy.
    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            debug!("graph cache invalidated");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedGraph>> {
        // The slot is only ever assigned a fully built graph, so a panic in
        // another holder cannot leave it half-written.
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

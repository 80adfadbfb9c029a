use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dryroutes_cli::output::{render_info, render_nodes, render_route, OutputFormat};
use dryroutes_cli::terminal::ColorPalette;
use dryroutes_lib::{
    resolve_fetch_timeout, route, DatasetSources, Graph, GraphCache, GraphSummary, HttpFetcher,
    RouteSummary,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flood-aware routing over the DryRoutes road graph"
)]
struct Cli {
    /// Nodes dataset URL or path. Falls back to DRYROUTES_NODES_SOURCE, then
    /// the public dataset.
    #[arg(long, global = true)]
    nodes: Option<String>,

    /// Edges dataset URL or path. Falls back to DRYROUTES_EDGES_SOURCE, then
    /// the public dataset.
    #[arg(long, global = true)]
    edges: Option<String>,

    /// Download timeout in seconds. Falls back to DRYROUTES_FETCH_TIMEOUT_SECS.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the cheapest route between two nodes.
    Route {
        /// Source node id.
        #[arg(long = "from")]
        from: String,
        /// Target node id.
        #[arg(long = "to")]
        to: String,
        /// Edge attribute to minimise: costo_total or tiempo.
        #[arg(long, default_value = "costo_total")]
        criterion: String,
    },
    /// List node ids with their coordinates.
    Nodes {
        /// Maximum number of nodes to print.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Load the graph and report its size.
    Info,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let sources = DatasetSources::resolve(cli.nodes.as_deref(), cli.edges.as_deref());
    let graph = load(&sources, cli.timeout)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Command::Route {
            from,
            to,
            criterion,
        } => handle_route(&mut out, &graph, from, to, criterion, cli.format),
        Command::Nodes { limit } => {
            render_nodes(&mut out, &graph, *limit, cli.format).context("failed to write output")
        }
        Command::Info => render_info(&mut out, &GraphSummary::new(&sources, &graph), cli.format)
            .context("failed to write output"),
    }
}

fn load(sources: &DatasetSources, timeout: Option<u64>) -> Result<Arc<Graph>> {
    let fetcher = HttpFetcher::with_timeout(resolve_fetch_timeout(timeout));
    GraphCache::global()
        .get_or_load(sources, &fetcher)
        .with_context(|| {
            format!(
                "failed to load road graph from {} and {}",
                sources.nodes, sources.edges
            )
        })
}

fn handle_route<W: Write>(
    out: &mut W,
    graph: &Graph,
    from: &str,
    to: &str,
    criterion: &str,
    format: OutputFormat,
) -> Result<()> {
    let outcome = route(graph, from, to, criterion)?;
    debug!(no_path = outcome.is_no_path(), "route computed");

    let summary = RouteSummary::from_outcome(graph, &outcome)
        .context("route references nodes missing from the graph")?;
    render_route(out, &summary, format, &ColorPalette::detect()).context("failed to write output")
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

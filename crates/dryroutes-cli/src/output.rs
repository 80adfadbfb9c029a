//! Output formatting for the `dryroutes` commands.
//!
//! Route summaries and graph descriptions come from `dryroutes-lib`; this
//! module only decides how they look on a terminal or as JSON.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use dryroutes_lib::{
    Graph, GraphSummary, Node, NodeId, RouteRenderMode, RouteStatus, RouteSummary,
};

use crate::terminal::{format_with_separators, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text with optional colors.
    #[default]
    Text,
    /// Markdown suitable for chat or notes.
    Rich,
    /// Plain text without styling.
    Basic,
    /// Pretty-printed JSON.
    Json,
}

/// Render a route summary in `format` into `writer`.
pub fn render_route<W: Write>(
    writer: &mut W,
    summary: &RouteSummary,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_route_text(writer, summary, palette),
        OutputFormat::Rich => {
            writer.write_all(summary.render(RouteRenderMode::RichText).as_bytes())
        }
        OutputFormat::Basic => {
            writer.write_all(summary.render(RouteRenderMode::PlainText).as_bytes())
        }
        OutputFormat::Json => render_json(writer, summary),
    }
}

fn render_route_text<W: Write>(
    writer: &mut W,
    summary: &RouteSummary,
    p: &ColorPalette,
) -> io::Result<()> {
    if summary.status == RouteStatus::NoPath {
        writeln!(
            writer,
            "{}No route{} from {}{}{} to {}{}{} (criterion: {})",
            p.red,
            p.reset,
            p.white_bold,
            summary.start.id,
            p.reset,
            p.white_bold,
            summary.goal.id,
            p.reset,
            summary.criterion
        )?;
        writeln!(
            writer,
            "{} STRT {} {} {}({}, {}){}",
            p.tag_start,
            p.reset,
            summary.start.id,
            p.gray,
            summary.start.coordinates.y,
            summary.start.coordinates.x,
            p.reset
        )?;
        writeln!(
            writer,
            "{} GOAL {} {} {}({}, {}){}",
            p.tag_goal,
            p.reset,
            summary.goal.id,
            p.gray,
            summary.goal.coordinates.y,
            summary.goal.coordinates.x,
            p.reset
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "Route from {}{}{} to {}{}{} ({} {}, criterion: {}):",
        p.white_bold,
        summary.start.id,
        p.reset,
        p.white_bold,
        summary.goal.id,
        p.reset,
        summary.hops,
        if summary.hops == 1 { "hop" } else { "hops" },
        summary.criterion
    )?;

    let last = summary.steps.len().saturating_sub(1);
    for step in &summary.steps {
        let tag = if step.index == 0 {
            format!("{} STRT {}", p.tag_start, p.reset)
        } else if step.index == last {
            format!("{} GOAL {}", p.tag_goal, p.reset)
        } else {
            "      ".to_string()
        };
        let hazard = step
            .peligrosidad
            .map(|value| format!(" {}hazard {value}{}", p.cyan, p.reset))
            .unwrap_or_default();
        writeln!(
            writer,
            "{tag} {}{}{} {}({}, {}){}{hazard}",
            p.white_bold, step.id, p.reset, p.gray, step.coordinates.y, step.coordinates.x, p.reset
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "Total distance: {}{:.1} m{}",
        p.green, summary.total_distance, p.reset
    )?;
    writeln!(
        writer,
        "Estimated time: {}{:.1} min{}",
        p.green, summary.total_time, p.reset
    )
}

/// Serialize `value` as pretty JSON followed by a newline.
pub fn render_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(io::Error::other)?;
    writeln!(writer)
}

/// Describe a loaded graph.
pub fn render_info<W: Write>(
    writer: &mut W,
    summary: &GraphSummary,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => render_json(writer, summary),
        _ => {
            writer.write_all(summary.render().as_bytes())?;
            writeln!(writer, "Nodes source: {}", summary.nodes_source)?;
            writeln!(writer, "Edges source: {}", summary.edges_source)
        }
    }
}

/// Node as listed by the `nodes` command.
#[derive(Debug, Serialize)]
pub struct NodeListing<'a> {
    pub id: &'a NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altura: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peligrosidad: Option<f64>,
}

impl<'a> From<&'a Node> for NodeListing<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            id: &node.id,
            x: node.coordinates.x,
            y: node.coordinates.y,
            altura: node.altura,
            peligrosidad: node.peligrosidad,
        }
    }
}

/// List graph nodes in identifier order, at most `limit` of them.
pub fn render_nodes<W: Write>(
    writer: &mut W,
    graph: &Graph,
    limit: Option<usize>,
    format: OutputFormat,
) -> io::Result<()> {
    let listings: Vec<NodeListing<'_>> = graph
        .node_ids()
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .filter_map(|id| graph.node(id))
        .map(NodeListing::from)
        .collect();

    if format == OutputFormat::Json {
        return render_json(writer, &listings);
    }

    for listing in &listings {
        write!(writer, "{} ({}, {})", listing.id, listing.y, listing.x)?;
        if let Some(peligrosidad) = listing.peligrosidad {
            write!(writer, " peligrosidad={peligrosidad}")?;
        }
        writeln!(writer)?;
    }
    if listings.len() < graph.node_count() {
        writeln!(
            writer,
            "... {} more",
            format_with_separators((graph.node_count() - listings.len()) as u64)
        )?;
    }
    Ok(())
}

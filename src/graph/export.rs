// src/graph/export.rs
// =============================================================================
// Writes the article graph out as Graphviz DOT and optionally renders it.
//
// Every visited article becomes a node, and so does every link target, even
// the ones the crawl never got to. Each recorded link is one directed edge.
//
// Rendering shells out to Graphviz's `dot` binary. It's optional: if `dot`
// isn't installed, the .dot file is still there and can be rendered later.
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ProbeError, Result};

use super::builder::ArticleGraph;

const GRAPH_COMMENT: &str = "WikipediaGraph";

/// Converts the crawl result into a petgraph directed graph.
/// Edge weights carry the link's href.
pub fn to_digraph(graph: &ArticleGraph) -> DiGraph<String, String> {
    let mut digraph = DiGraph::new();
    let mut indices: HashMap<String, NodeIndex> = HashMap::new();

    // Visited articles first so they get the low indices
    for node in graph.nodes() {
        node_index(&mut digraph, &mut indices, &node.title);
    }

    for node in graph.nodes() {
        let from = node_index(&mut digraph, &mut indices, &node.title);
        for link in &node.links {
            let to = node_index(&mut digraph, &mut indices, &link.title);
            digraph.add_edge(from, to, link.href.clone());
        }
    }

    digraph
}

fn node_index(
    digraph: &mut DiGraph<String, String>,
    indices: &mut HashMap<String, NodeIndex>,
    title: &str,
) -> NodeIndex {
    if let Some(&idx) = indices.get(title) {
        return idx;
    }
    let idx = digraph.add_node(title.to_string());
    indices.insert(title.to_string(), idx);
    idx
}

/// DOT source for the graph, with a leading comment line
pub fn render_dot(graph: &ArticleGraph) -> String {
    let digraph = to_digraph(graph);
    format!(
        "// {}\n{}",
        GRAPH_COMMENT,
        Dot::with_config(&digraph, &[Config::EdgeNoLabel])
    )
}

pub fn write_dot(graph: &ArticleGraph, path: &Path) -> Result<()> {
    fs::write(path, render_dot(graph))?;
    info!(path = %path.display(), "Wrote DOT graph");
    Ok(())
}

// Renders a DOT file with Graphviz
//
// Parameters:
//   dot_path: the .dot file written by write_dot
//   format: any Graphviz output format (png, svg, pdf...)
//
// Returns: path of the rendered image (dot_path with the format as extension)
pub async fn render_image(dot_path: &Path, format: &str) -> Result<PathBuf> {
    if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric() || c == ':') {
        return Err(ProbeError::Config(format!("invalid render format '{}'", format)));
    }

    let output = dot_path.with_extension(format);
    debug!(input = %dot_path.display(), output = %output.display(), "Running dot");

    let result = Command::new("dot")
        .arg(format!("-T{}", format))
        .arg(dot_path)
        .arg("-o")
        .arg(&output)
        .output()
        .await
        .map_err(|e| {
            ProbeError::Render(format!(
                "could not run Graphviz 'dot' ({}); make sure Graphviz is installed and on PATH",
                e
            ))
        })?;

    if !result.status.success() {
        return Err(ProbeError::Render(format!(
            "dot exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }

    Ok(output)
}

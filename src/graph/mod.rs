// src/graph/mod.rs
// =============================================================================
// The Wikipedia link graph.
//
// Submodules:
// - builder: breadth-first crawl from a seed article, bounded by a node limit
// - export: DOT output and optional Graphviz rendering
// =============================================================================

mod builder;
mod export;

pub use builder::{ArticleGraph, ArticleNode, Frontier, GraphBuilder};
pub use export::{render_dot, render_image, to_digraph, write_dot};

// src/graph/builder.rs
// =============================================================================
// Builds a link graph of Wikipedia articles with a breadth-first crawl.
//
// How it works:
// 1. Start with the seed title in a queue
// 2. Pop the front title, fetch its HTML through the API
// 3. Extract the lead links and record title -> links in the graph
// 4. Queue every linked title that is neither queued nor visited yet
// 5. Repeat until the queue is empty or the graph holds `limit` articles
//
// The limit is checked before each pop. Each pass adds at most one article,
// so the graph never grows past the limit; titles still waiting in the queue
// at that point are simply never fetched.
//
// A title whose fetch fails is marked visited (no retry), contributes no
// links and is listed in `failed` instead of the graph.
// =============================================================================

use std::collections::{HashMap, HashSet, VecDeque};

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::wiki::{extract_links, fetch_article, ArticleLink};

/// An article and the lead links found in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleNode {
    pub title: String,
    pub links: Vec<ArticleLink>,
}

/// Articles in the order they were visited, each title at most once
#[derive(Debug, Default, Serialize)]
pub struct ArticleGraph {
    nodes: Vec<ArticleNode>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
    failed: Vec<String>,
}

impl ArticleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; a title that is already present is left untouched
    pub fn insert(&mut self, node: ArticleNode) -> bool {
        if self.positions.contains_key(&node.title) {
            return false;
        }
        self.positions.insert(node.title.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn get(&self, title: &str) -> Option<&ArticleNode> {
        self.positions.get(title).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.positions.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ArticleNode] {
        &self.nodes
    }

    /// Titles that could not be fetched or parsed
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.links.len()).sum()
    }
}

// Queue + visited set of the crawl.
// A title lives in at most one of the two at any time.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new(seed: &str) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(seed);
        frontier
    }

    /// Appends a title unless it's already queued or visited
    pub fn enqueue(&mut self, title: &str) -> bool {
        if self.visited.contains(title) || self.queued.contains(title) {
            return false;
        }
        self.queued.insert(title.to_string());
        self.queue.push_back(title.to_string());
        true
    }

    pub fn pop(&mut self) -> Option<String> {
        let title = self.queue.pop_front()?;
        self.queued.remove(&title);
        Some(title)
    }

    pub fn mark_visited(&mut self, title: &str) {
        self.queued.remove(title);
        self.visited.insert(title.to_string());
    }

    pub fn is_visited(&self, title: &str) -> bool {
        self.visited.contains(title)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

pub struct GraphBuilder<'a> {
    client: &'a Client,
    config: &'a GraphConfig,
    progress: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(client: &'a Client, config: &'a GraphConfig) -> Self {
        Self {
            client,
            config,
            progress: false,
        }
    }

    /// Print one line per article to stdout while crawling
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    // Runs the crawl from `seed` and returns the finished graph.
    // Fetches happen one at a time; this loop is the only writer of the
    // queue, the visited set and the graph.
    pub async fn build(&self, seed: &str) -> ArticleGraph {
        let mut graph = ArticleGraph::new();
        let mut frontier = Frontier::new(seed);

        info!(seed, limit = self.config.limit, "Starting graph crawl");

        while graph.len() < self.config.limit {
            // enqueue() refuses visited titles, so every pop is a fresh one
            let Some(title) = frontier.pop() else {
                break;
            };

            if self.progress {
                println!("Processing article: {}", title);
            }

            match fetch_article(self.client, &self.config.wiki_url, &title).await {
                Ok(html) => {
                    let links = extract_links(Some(&html), &self.config.file_namespaces);
                    debug!(title = %title, links = links.len(), "Extracted links");

                    for link in &links {
                        if !link.title.is_empty() && link.title != title {
                            frontier.enqueue(&link.title);
                        }
                    }

                    graph.insert(ArticleNode {
                        title: title.clone(),
                        links,
                    });
                }
                Err(e) => {
                    warn!(title = %title, error = %e, "Skipping article");
                    graph.failed.push(title.clone());
                }
            }

            frontier.mark_visited(&title);
        }

        info!(
            articles = graph.len(),
            edges = graph.edge_count(),
            failed = graph.failed.len(),
            pending = frontier.pending(),
            "Graph crawl finished"
        );

        graph
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why VecDeque plus a HashSet for the queue?
//    - VecDeque gives O(1) push_back/pop_front, which is what BFS needs
//    - Checking "is this title already queued?" on a VecDeque is O(n)
//    - The `queued` HashSet answers that in O(1) and is kept in sync
//
// 2. What does GraphBuilder<'a> mean?
//    - The builder borrows the client and config instead of owning them
//    - 'a says "the builder can't outlive what it borrowed"
//
// 3. Why is `failed` separate from the graph?
//    - The graph only holds articles we actually read
//    - Failed titles still count as visited, so they are never fetched twice
// -----------------------------------------------------------------------------

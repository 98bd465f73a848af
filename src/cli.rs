// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands, one per pipeline:
// - search: Common Crawl index -> WARC records -> keyword matches
// - graph: Wikipedia article -> breadth-first link graph -> DOT file
//
// Every default lives in config.rs so the CLI and the library agree.
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use wiki_probe::config::{
    DEFAULT_CONCURRENCY, DEFAULT_DATA_URL, DEFAULT_GRAPH_LIMIT, DEFAULT_GRAPH_OUTPUT,
    DEFAULT_INDEX_URL, DEFAULT_LANG, DEFAULT_RECORD_LIMIT, DEFAULT_SITE_PATTERN,
    DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "wiki-probe",
    version,
    about = "Keyword-scan Common Crawl captures of Wikipedia and map article link graphs",
    long_about = "wiki-probe has two modes. `search` looks up Wikipedia captures in the Common Crawl \
                  index, fetches each page from its WARC file and reports pages matching a keyword \
                  dictionary. `graph` follows the lead links of a Wikipedia article breadth-first \
                  and writes the resulting graph as a Graphviz DOT file."
)]
pub struct Cli {
    /// Increase log detail (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search Common Crawl for Wikipedia pages mentioning the keywords
    ///
    /// Example: wiki-probe search --index CC-MAIN-2024-38 --limit 50
    Search {
        /// Index partition to query; repeat for several (default: seven 2024 crawls)
        #[arg(long = "index", value_name = "PARTITION")]
        indexes: Vec<String>,

        /// Records kept per partition
        #[arg(long, default_value_t = DEFAULT_RECORD_LIMIT)]
        limit: usize,

        /// URL pattern sent to the index
        #[arg(long, default_value = DEFAULT_SITE_PATTERN)]
        site: String,

        /// JSON file with [{"pattern": ..., "term": ...}] replacing the built-in keywords
        #[arg(long, value_name = "FILE")]
        patterns: Option<PathBuf>,

        /// Page fetches in flight at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Base URL of the CDX index server
        #[arg(long, default_value = DEFAULT_INDEX_URL)]
        index_url: String,

        /// Base URL the WARC filenames are relative to
        #[arg(long, default_value = DEFAULT_DATA_URL)]
        data_url: String,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build a link graph starting from one Wikipedia article
    ///
    /// Example: wiki-probe graph "Лошадь" --limit 30 --render png
    Graph {
        /// Seed article title; read from stdin when omitted
        title: Option<String>,

        /// Maximum number of articles in the graph
        #[arg(long, default_value_t = DEFAULT_GRAPH_LIMIT)]
        limit: usize,

        /// Wikipedia language edition
        #[arg(long, default_value = DEFAULT_LANG)]
        lang: String,

        /// Wiki base URL (default: https://<lang>.wikipedia.org)
        #[arg(long)]
        wiki_url: Option<String>,

        /// Extra namespace name whose links count as media files; repeatable
        #[arg(long = "file-namespace", value_name = "NAME")]
        file_namespaces: Vec<String>,

        /// Where to write the DOT file
        #[arg(short, long, default_value = DEFAULT_GRAPH_OUTPUT)]
        output: PathBuf,

        /// Also render the graph with Graphviz in this format (png, svg, pdf...)
        #[arg(long, value_name = "FORMAT")]
        render: Option<String>,

        /// Output the graph in JSON format
        #[arg(long)]
        json: bool,
    },
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `global = true` do?
//    - The flag is accepted before or after the subcommand name
//    - `wiki-probe -v graph X` and `wiki-probe graph X -v` both work
//
// 2. Why Vec<String> for --index?
//    - clap collects a repeated flag into a Vec
//    - An empty Vec means "not given", and main.rs falls back to the defaults
//
// 3. Why Option<String> for the title?
//    - A positional argument wrapped in Option becomes optional
//    - When it's None we ask for the title on stdin instead
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let cli = Cli::parse_from(["wiki-probe", "search"]);
        match cli.command {
            Commands::Search {
                indexes,
                limit,
                site,
                json,
                ..
            } => {
                assert!(indexes.is_empty());
                assert_eq!(limit, DEFAULT_RECORD_LIMIT);
                assert_eq!(site, "ru.wikipedia.org/*");
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_repeated_index_flags() {
        let cli = Cli::parse_from([
            "wiki-probe", "-vv", "search", "--index", "CC-MAIN-2024-38", "--index", "CC-MAIN-2024-33",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search { indexes, .. } => {
                assert_eq!(indexes, vec!["CC-MAIN-2024-38", "CC-MAIN-2024-33"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_graph_args() {
        let cli = Cli::parse_from([
            "wiki-probe", "graph", "Лошадь", "--limit", "5", "--render", "svg", "--timeout", "3",
        ]);
        assert_eq!(cli.timeout, 3);
        match cli.command {
            Commands::Graph {
                title,
                limit,
                lang,
                render,
                output,
                ..
            } => {
                assert_eq!(title.as_deref(), Some("Лошадь"));
                assert_eq!(limit, 5);
                assert_eq!(lang, "ru");
                assert_eq!(render.as_deref(), Some("svg"));
                assert_eq!(output, PathBuf::from("wikipedia_graph.dot"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_graph_title_is_optional() {
        let cli = Cli::parse_from(["wiki-probe", "graph"]);
        assert!(matches!(cli.command, Commands::Graph { title: None, .. }));
    }
}

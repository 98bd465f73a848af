// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Build the per-run config and the shared HTTP client
// 4. Dispatch to the subcommand handler and print its results
// 5. Exit with proper code (0 = run completed, 2 = configuration/fatal error)
//
// Fetch failures never end the run: they are logged and the run reports
// whatever it managed to gather.
// =============================================================================

// Module declarations - the CLI lives in the binary, everything else in the library
mod cli; // src/cli.rs - command-line parsing

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
// The library half of this package (src/lib.rs)
use wiki_probe::commoncrawl::{self, PartitionReport, PartitionStatus, ScanSummary};
use wiki_probe::config::{self, GraphConfig, SearchConfig};
use wiki_probe::graph::{self, ArticleGraph, GraphBuilder};
use wiki_probe::keywords::{self, KeywordMatcher};

const DELIMITER_WIDTH: usize = 50;

#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole anyhow context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = the run completed (even if some fetches failed)
//   Err = configuration or other fatal error (main turns it into exit code 2)
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // One HTTP client for the whole run; a zero --timeout is rejected here
    let client = config::build_client(Duration::from_secs(cli.timeout))
        .context("Failed to create HTTP client")?;

    // Match on which subcommand was used
    match cli.command {
        Commands::Search {
            indexes,
            limit,
            site,
            patterns,
            concurrency,
            index_url,
            data_url,
            json,
        } => {
            // CLI values override the defaults; an empty --index list keeps the default partitions
            let defaults = SearchConfig::default();
            let config = SearchConfig {
                index_url,
                data_url,
                site_pattern: site,
                indexes: if indexes.is_empty() { defaults.indexes } else { indexes },
                limit,
                concurrency,
                patterns_file: patterns,
            };
            // Bad limits are fatal before any request goes out
            config.validate()?;
            handle_search(&client, &config, json).await
        }
        Commands::Graph {
            title,
            limit,
            lang,
            wiki_url,
            file_namespaces,
            output,
            render,
            json,
        } => {
            // Start from the language defaults, then apply the overrides
            let mut config = GraphConfig::for_language(&lang);
            if let Some(url) = wiki_url {
                config.wiki_url = url;
            }
            config.file_namespaces.extend(file_namespaces);
            config.limit = limit;
            config.output = output;
            config.render_format = render;
            config.validate()?;

            // No title argument: ask for one on stdin
            let seed = match title {
                Some(t) => t.trim().to_string(),
                None => read_title(io::stdin().lock(), io::stderr())?,
            };
            if seed.is_empty() {
                bail!("an article title is required");
            }

            handle_graph(&client, &config, &seed, json).await
        }
    }
}

// Logs go to stderr so stdout stays clean for results (and --json).
// RUST_LOG wins over -v when it is set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wiki_probe={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// Reads the seed title from `input`.
// The prompt goes to `prompt` (stderr in practice), so stdout only ever
// carries results and `graph --json` stays valid JSON.
fn read_title(mut input: impl BufRead, mut prompt: impl Write) -> Result<String> {
    write!(prompt, "Enter article title: ")?;
    prompt.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read article title from stdin")?;
    Ok(line.trim().to_string())
}

// Handles the 'search' subcommand
//
// Patterns are compiled before any request goes out, so a typo in a pattern
// file fails fast instead of after minutes of downloading.
async fn handle_search(client: &Client, config: &SearchConfig, json: bool) -> Result<i32> {
    let patterns = match &config.patterns_file {
        Some(path) => keywords::load_patterns(path)
            .with_context(|| format!("Failed to load patterns from {}", path.display()))?,
        None => keywords::default_patterns(),
    };
    // Compile once; every page is matched against the same set
    let matcher = KeywordMatcher::new(&patterns)?;
    info!(patterns = matcher.len(), "Keyword patterns compiled");

    if !json {
        println!(
            "Searching {} index partition(s) for {}",
            config.indexes.len(),
            config.site_pattern
        );
    }

    // Step 1: query every partition and merge the records by URL
    let (unique, reports) = commoncrawl::search_partitions(client, config).await;

    if !json {
        println!("Unique results after deduplication: {}", unique.len());
        println!();
    }

    // Step 2: fetch each unique record and keyword-match its page
    let summary = commoncrawl::scan_pages(client, config, &unique, &matcher).await;

    // Step 3: print results (JSON or human-readable)
    if json {
        let output = serde_json::json!({
            "partitions": reports,
            "unique_results": unique.len(),
            "fetched": summary.fetched,
            "failed": summary.failed,
            "matches": summary.matches,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_matches(&summary);
        print_search_summary(&reports, unique.len(), &summary);
    }

    Ok(0)
}

fn print_matches(summary: &ScanSummary) {
    for page in &summary.matches {
        println!("Title: {}", page.title);
        println!("URL: {}", page.display_url);
        println!("Keywords: {}", page.keywords.join(", "));
        println!("\n{}\n", "-".repeat(DELIMITER_WIDTH));
    }
}

fn print_search_summary(reports: &[PartitionReport], unique: usize, summary: &ScanSummary) {
    println!("Partitions:");
    for report in reports {
        let status = match &report.status {
            PartitionStatus::Records { count } => format!("{} record(s)", count),
            PartitionStatus::NoMatches => "no captures".to_string(),
            PartitionStatus::Failed { reason } => format!("FAILED ({})", reason),
        };
        println!("   {:<20} {}", report.partition, status);
    }
    println!();
    println!("Summary:");
    println!("   Unique URLs: {}", unique);
    println!("   Pages fetched: {}", summary.fetched);
    println!("   Pages failed: {}", summary.failed);
    println!("   Pages matched: {}", summary.matches.len());
}

// Handles the 'graph' subcommand
async fn handle_graph(client: &Client, config: &GraphConfig, seed: &str, json: bool) -> Result<i32> {
    // Progress lines would corrupt --json output, so they're off in that mode
    let graph = GraphBuilder::new(client, config)
        .with_progress(!json)
        .build(seed)
        .await;

    // The DOT file is always written, even for an empty graph
    graph::write_dot(&graph, &config.output)
        .with_context(|| format!("Failed to write graph to {}", config.output.display()))?;

    // Rendering needs Graphviz installed; failing here only costs the image
    let rendered = match &config.render_format {
        Some(format) => match graph::render_image(&config.output, format).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Graph rendering skipped");
                None
            }
        },
        None => None,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        print_graph_summary(&graph, config);
        if let Some(path) = rendered {
            println!("Rendered image saved to {}", path.display());
        }
    }

    Ok(0)
}

fn print_graph_summary(graph: &ArticleGraph, config: &GraphConfig) {
    println!();
    println!("Graph saved to {}", config.output.display());
    println!("   Articles: {}", graph.len());
    println!("   Links: {}", graph.edge_count());
    if !graph.failed().is_empty() {
        println!("   Failed: {}", graph.failed().join(", "));
    }
}

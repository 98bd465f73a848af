// src/config.rs
// =============================================================================
// Defaults and per-run configuration for both pipelines.
//
// The constants below are the values the CLI falls back to. The two config
// structs are built once from the parsed arguments, validated, and then
// passed by reference into the pipeline code. Nothing here is global or
// mutable after startup.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{ProbeError, Result};

/// Common Crawl CDX index server
pub const DEFAULT_INDEX_URL: &str = "http://index.commoncrawl.org";

/// Where the WARC files referenced by the index live
pub const DEFAULT_DATA_URL: &str = "https://data.commoncrawl.org";

/// URL pattern sent to the index
pub const DEFAULT_SITE_PATTERN: &str = "ru.wikipedia.org/*";

/// Index partitions searched when none are given on the command line
pub const DEFAULT_INDEXES: &[&str] = &[
    "CC-MAIN-2024-38",
    "CC-MAIN-2024-33",
    "CC-MAIN-2024-30",
    "CC-MAIN-2024-26",
    "CC-MAIN-2024-22",
    "CC-MAIN-2024-18",
    "CC-MAIN-2024-10",
];

/// Records kept per index partition
pub const DEFAULT_RECORD_LIMIT: usize = 100;

/// Page fetches in flight at once during a search
pub const DEFAULT_CONCURRENCY: usize = 8;

pub const DEFAULT_LANG: &str = "ru";

/// Articles kept in the link graph
pub const DEFAULT_GRAPH_LIMIT: usize = 30;

pub const DEFAULT_GRAPH_OUTPUT: &str = "wikipedia_graph.dot";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const USER_AGENT: &str = concat!("wiki-probe/", env!("CARGO_PKG_VERSION"));

/// Settings for the `search` pipeline
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub index_url: String,
    pub data_url: String,
    pub site_pattern: String,
    pub indexes: Vec<String>,
    pub limit: usize,
    pub concurrency: usize,
    pub patterns_file: Option<PathBuf>,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(ProbeError::Config("record limit must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(ProbeError::Config("concurrency must be at least 1".into()));
        }
        if self.indexes.is_empty() {
            return Err(ProbeError::Config("at least one index partition is required".into()));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            site_pattern: DEFAULT_SITE_PATTERN.to_string(),
            indexes: DEFAULT_INDEXES.iter().map(|s| s.to_string()).collect(),
            limit: DEFAULT_RECORD_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            patterns_file: None,
        }
    }
}

/// Settings for the `graph` pipeline
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Base URL of the wiki, e.g. https://ru.wikipedia.org
    pub wiki_url: String,
    /// Namespace names whose links are media files, matched after decoding
    pub file_namespaces: Vec<String>,
    pub limit: usize,
    pub output: PathBuf,
    /// Graphviz output format (png, svg, pdf...); None skips rendering
    pub render_format: Option<String>,
}

impl GraphConfig {
    /// Builds a config for a language edition of Wikipedia
    pub fn for_language(lang: &str) -> Self {
        Self {
            wiki_url: format!("https://{}.wikipedia.org", lang),
            file_namespaces: file_namespaces(lang),
            limit: DEFAULT_GRAPH_LIMIT,
            output: PathBuf::from(DEFAULT_GRAPH_OUTPUT),
            render_format: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(ProbeError::Config("graph limit must be at least 1".into()));
        }
        Ok(())
    }
}

// The local name of the File namespace for the editions we know about.
// MediaWiki accepts the canonical English "File" on every edition, so it is
// always included.
pub fn file_namespaces(lang: &str) -> Vec<String> {
    let local = match lang {
        "ru" | "uk" | "be" => Some("Файл"),
        "de" => Some("Datei"),
        "fr" => Some("Fichier"),
        "es" => Some("Archivo"),
        "it" | "pt" => Some("File"),
        "pl" => Some("Plik"),
        "nl" => Some("Bestand"),
        _ => None,
    };

    let mut names = Vec::new();
    if let Some(name) = local {
        names.push(name.to_string());
    }
    if !names.iter().any(|n| n == "File") {
        names.push("File".to_string());
    }
    names
}

// One client per run, shared by every request.
// reqwest::Client is an Arc internally, so clones are cheap.
// A zero timeout is a configuration error.
pub fn build_client(timeout: Duration) -> Result<Client> {
    if timeout.is_zero() {
        return Err(ProbeError::Config("timeout must be at least 1 second".into()));
    }

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout / 2)
        .build()?;
    Ok(client)
}

/// Joins a base URL and a relative path, keeping any path the base already has
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base)
        .map_err(|e| ProbeError::Config(format!("invalid base URL '{}': {}", base, e)))?;

    // Url::join replaces the last segment unless the base ends with '/'
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    base.join(path.trim_start_matches('/'))
        .map_err(|e| ProbeError::Config(format!("invalid path '{}': {}", path, e)))
}

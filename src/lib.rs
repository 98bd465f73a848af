//! Two small research tools over Russian Wikipedia.
//!
//! - [`commoncrawl`] finds Wikipedia captures in the Common Crawl index,
//!   pulls each page out of its WARC file and keyword-matches it with
//!   [`keywords`].
//! - [`graph`] crawls article links breadth-first through the MediaWiki API
//!   ([`wiki`]) and exports the result as a DOT graph.

pub mod commoncrawl;
pub mod config;
pub mod error;
pub mod graph;
pub mod keywords;
pub mod wiki;

pub use error::{ProbeError, Result};

// src/commoncrawl/mod.rs
// =============================================================================
// The Common Crawl side of the tool: find captures of a site in the index,
// pull each capture out of its WARC file, and keyword-match the page.
//
// Submodules:
// - index: CDX index queries and URL deduplication
// - record: ranged fetch of a single WARC record
// - warc: WARC record parsing
// - page: HTML payload -> title + text
// =============================================================================

mod index;
mod page;
mod record;
mod warc;

pub use index::{
    parse_index_lines, search_index, search_partitions, IndexRecord, PartitionReport,
    PartitionStatus, SearchOutcome, UniqueResults,
};
pub use page::{display_url, extract_page, PageText};
pub use record::{byte_range, fetch_single_record};
pub use warc::{first_response_payload, WarcReader, WarcRecord};

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::keywords::KeywordMatcher;

/// A page whose text matched at least one keyword
#[derive(Debug, Clone, Serialize)]
pub struct PageMatch {
    pub title: String,
    pub url: String,
    pub display_url: String,
    pub keywords: Vec<String>,
}

/// Totals for one scan over the unique index records
#[derive(Debug, Default, Serialize)]
pub struct ScanSummary {
    pub matches: Vec<PageMatch>,
    pub fetched: usize,
    pub failed: usize,
}

// Fetches every unique record and keyword-matches its page
//
// Up to `config.concurrency` fetches run at once. Each page is matched inside
// its own future, so a body lives only until it has been scanned. Results
// keep the order of the records, so output is stable between runs.
pub async fn scan_pages(
    client: &Client,
    config: &SearchConfig,
    records: &UniqueResults,
    matcher: &KeywordMatcher,
) -> ScanSummary {
    let data_url = config.data_url.as_str();

    // None = fetch failed, Some(None) = fetched but no keywords
    let scans = records.iter().map(|record| async move {
        let Some(payload) = fetch_single_record(
            client,
            data_url,
            &record.filename,
            record.offset,
            record.length,
        )
        .await
        else {
            return None;
        };
        Some(match_page(&record.url, &payload, matcher))
    });

    let mut results = stream::iter(scans).buffered(config.concurrency);
    let mut summary = ScanSummary::default();
    while let Some(result) = results.next().await {
        match result {
            Some(page_match) => {
                summary.fetched += 1;
                summary.matches.extend(page_match);
            }
            None => summary.failed += 1,
        }
    }

    info!(
        fetched = summary.fetched,
        failed = summary.failed,
        matched = summary.matches.len(),
        "Page scan complete"
    );
    summary
}

/// Keyword-matches one HTML payload; None when nothing matched
pub fn match_page(url: &str, payload: &[u8], matcher: &KeywordMatcher) -> Option<PageMatch> {
    let page = extract_page(payload);
    let keywords = matcher.find_keywords(&page.text);

    if keywords.is_empty() {
        debug!(url, "No keywords on page");
        return None;
    }

    Some(PageMatch {
        title: page.title,
        url: url.to_string(),
        display_url: display_url(url),
        keywords,
    })
}

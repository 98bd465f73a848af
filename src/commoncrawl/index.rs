// src/commoncrawl/index.rs
// =============================================================================
// Searches the Common Crawl CDX index for captures of a site.
//
// How it works:
// 1. Ask one index partition (e.g. CC-MAIN-2024-38) for every capture whose
//    URL matches a pattern like "ru.wikipedia.org/*"
// 2. The server answers with one JSON object per line
// 3. Keep the first `limit` lines and parse each into an IndexRecord
// 4. Repeat for every partition and fold the records into a map keyed by URL
//
// A failing partition never stops the others. Callers get a SearchOutcome
// that separates "the index had nothing" from "the request failed".
// =============================================================================

use std::collections::HashMap;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{join_url, SearchConfig};
use crate::error::{ProbeError, Result};

// The index answers 404 with this message when a pattern has no captures
const NO_CAPTURES_MARKER: &str = "No Captures found";

/// One archived capture: where it lives inside which WARC file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub url: String,
    pub filename: String,
    #[serde(deserialize_with = "string_or_number")]
    pub offset: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

// The CDX server sends offset and length as strings ("12345"),
// other tools write plain numbers. Accept both.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// What one partition query produced
#[derive(Debug)]
pub enum SearchOutcome {
    /// The index returned at least one record
    Records(Vec<IndexRecord>),
    /// The index answered, but nothing matched
    NoMatches,
    /// The request or the response body was unusable
    Failed(ProbeError),
}

impl SearchOutcome {
    pub fn record_count(&self) -> usize {
        match self {
            SearchOutcome::Records(records) => records.len(),
            _ => 0,
        }
    }
}

// Queries a single index partition
//
// Parameters:
//   client: shared HTTP client
//   index_url: base of the index server (http://index.commoncrawl.org)
//   partition: partition name, e.g. "CC-MAIN-2024-38"
//   site_pattern: URL pattern, e.g. "ru.wikipedia.org/*"
//   limit: maximum number of records to keep (>= 1)
//
// Never returns an error: failures become SearchOutcome::Failed
pub async fn search_index(
    client: &Client,
    index_url: &str,
    partition: &str,
    site_pattern: &str,
    limit: usize,
) -> SearchOutcome {
    match fetch_index(client, index_url, partition, site_pattern, limit).await {
        Ok(records) if records.is_empty() => {
            info!(partition, "No captures in index");
            SearchOutcome::NoMatches
        }
        Ok(records) => {
            info!(partition, records = records.len(), "Index search complete");
            SearchOutcome::Records(records)
        }
        Err(e) => {
            error!(partition, error = %e, "Index search failed");
            SearchOutcome::Failed(e)
        }
    }
}

async fn fetch_index(
    client: &Client,
    index_url: &str,
    partition: &str,
    site_pattern: &str,
    limit: usize,
) -> Result<Vec<IndexRecord>> {
    let url = join_url(index_url, &format!("{}-index", partition))?;
    debug!(%url, site_pattern, "Querying index");

    // reqwest percent-encodes the query values for us
    let response = client
        .get(url.clone())
        .query(&[("url", site_pattern), ("output", "json")])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::NOT_FOUND && body.contains(NO_CAPTURES_MARKER) {
        return Ok(Vec::new());
    }

    if status != StatusCode::OK {
        return Err(ProbeError::Transport {
            url: url.to_string(),
            status,
        });
    }

    parse_index_lines(&body, limit)
}

// Parses newline-delimited JSON into records, stopping after `limit` lines.
// Lines past the limit are never looked at, so a broken tail is harmless.
pub fn parse_index_lines(body: &str, limit: usize) -> Result<Vec<IndexRecord>> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(|line| serde_json::from_str::<IndexRecord>(line).map_err(ProbeError::from))
        .collect()
}

/// Records keyed by URL. A later record for the same URL replaces the
/// earlier one but keeps its position, so iteration order is stable.
#[derive(Debug, Default)]
pub struct UniqueResults {
    records: Vec<IndexRecord>,
    positions: HashMap<String, usize>,
}

impl UniqueResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the URL had not been seen before
    pub fn insert(&mut self, record: IndexRecord) -> bool {
        match self.positions.get(&record.url) {
            Some(&pos) => {
                self.records[pos] = record;
                false
            }
            None => {
                self.positions.insert(record.url.clone(), self.records.len());
                self.records.push(record);
                true
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&IndexRecord> {
        self.positions.get(url).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexRecord> {
        self.records.iter()
    }
}

/// Per-partition line for the run summary
#[derive(Debug, Clone, Serialize)]
pub struct PartitionReport {
    pub partition: String,
    #[serde(flatten)]
    pub status: PartitionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionStatus {
    Records { count: usize },
    NoMatches,
    Failed { reason: String },
}

impl From<&SearchOutcome> for PartitionStatus {
    fn from(outcome: &SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Records(records) => PartitionStatus::Records {
                count: records.len(),
            },
            SearchOutcome::NoMatches => PartitionStatus::NoMatches,
            SearchOutcome::Failed(e) => PartitionStatus::Failed {
                reason: e.to_string(),
            },
        }
    }
}

// Queries every configured partition in order and deduplicates by URL
//
// Returns the unique records plus one report per partition
pub async fn search_partitions(
    client: &Client,
    config: &SearchConfig,
) -> (UniqueResults, Vec<PartitionReport>) {
    let mut unique = UniqueResults::new();
    let mut reports = Vec::with_capacity(config.indexes.len());

    for partition in &config.indexes {
        let outcome = search_index(
            client,
            &config.index_url,
            partition,
            &config.site_pattern,
            config.limit,
        )
        .await;

        reports.push(PartitionReport {
            partition: partition.clone(),
            status: PartitionStatus::from(&outcome),
        });

        if let SearchOutcome::Records(records) = outcome {
            for record in records {
                unique.insert(record);
            }
        }
    }

    let failed = reports
        .iter()
        .filter(|r| matches!(r.status, PartitionStatus::Failed { .. }))
        .count();
    if failed > 0 {
        warn!(failed, total = reports.len(), "Some index partitions failed");
    }
    info!(unique = unique.len(), "Unique results after deduplication");

    (unique, reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn line(url: &str, offset: u64) -> String {
        format!(
            r#"{{"urlkey": "org,wikipedia,ru)/", "timestamp": "20240901000000", "url": "{}", "mime": "text/html", "status": "200", "filename": "crawl-data/a.warc.gz", "offset": "{}", "length": "500"}}"#,
            url, offset
        )
    }

    fn three_lines() -> String {
        [
            line("https://ru.wikipedia.org/wiki/A", 0),
            line("https://ru.wikipedia.org/wiki/B", 500),
            line("https://ru.wikipedia.org/wiki/C", 1000),
        ]
        .join("\n")
            + "\n"
    }

    fn client() -> Client {
        crate::config::build_client(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_string_offsets() {
        let records = parse_index_lines(&line("https://ru.wikipedia.org/", 42), 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 42);
        assert_eq!(records[0].length, 500);
        assert_eq!(records[0].status.as_deref(), Some("200"));
    }

    #[test]
    fn test_parse_numeric_offsets() {
        let body = r#"{"url": "u", "filename": "f", "offset": 7, "length": 9}"#;
        let records = parse_index_lines(body, 1).unwrap();
        assert_eq!(records[0].offset, 7);
        assert_eq!(records[0].length, 9);
        assert_eq!(records[0].timestamp, None);
    }

    #[test]
    fn test_parse_respects_limit() {
        assert_eq!(parse_index_lines(&three_lines(), 10).unwrap().len(), 3);

        let first_two = parse_index_lines(&three_lines(), 2).unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(first_two[0].url, "https://ru.wikipedia.org/wiki/A");
        assert_eq!(first_two[1].url, "https://ru.wikipedia.org/wiki/B");
    }

    #[test]
    fn test_malformed_line_beyond_limit_is_ignored() {
        let body = format!("{}\nnot json", line("u", 0));
        assert_eq!(parse_index_lines(&body, 1).unwrap().len(), 1);
        assert!(parse_index_lines(&body, 2).is_err());
    }

    #[test]
    fn test_unique_results_last_writer_wins() {
        let mut unique = UniqueResults::new();
        let first = parse_index_lines(&line("https://x/", 1), 1).unwrap().remove(0);
        let other = parse_index_lines(&line("https://y/", 2), 1).unwrap().remove(0);
        let second = parse_index_lines(&line("https://x/", 3), 1).unwrap().remove(0);

        assert!(unique.insert(first));
        assert!(unique.insert(other));
        assert!(!unique.insert(second));

        assert_eq!(unique.len(), 2);
        assert_eq!(unique.get("https://x/").unwrap().offset, 3);
        // Replaced record keeps the first position
        let urls: Vec<_> = unique.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/", "https://y/"]);
    }

    #[tokio::test]
    async fn test_search_index_three_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/CC-MAIN-2024-38-index"))
            .and(query_param("url", "ru.wikipedia.org/*"))
            .and(query_param("output", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(three_lines()))
            .mount(&server)
            .await;

        let client = client();
        let all = search_index(&client, &server.uri(), "CC-MAIN-2024-38", "ru.wikipedia.org/*", 10).await;
        assert_eq!(all.record_count(), 3);

        let two = search_index(&client, &server.uri(), "CC-MAIN-2024-38", "ru.wikipedia.org/*", 2).await;
        match two {
            SearchOutcome::Records(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1].url, "https://ru.wikipedia.org/wiki/B");
            }
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_index_distinguishes_empty_from_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/EMPTY-index"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string(r#"{"message": "No Captures found for: ru.wikipedia.org/*"}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/BLANK-index"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/BROKEN-index"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/GARBAGE-index"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client();
        let uri = server.uri();
        assert!(matches!(
            search_index(&client, &uri, "EMPTY", "x/*", 5).await,
            SearchOutcome::NoMatches
        ));
        assert!(matches!(
            search_index(&client, &uri, "BLANK", "x/*", 5).await,
            SearchOutcome::NoMatches
        ));
        assert!(matches!(
            search_index(&client, &uri, "BROKEN", "x/*", 5).await,
            SearchOutcome::Failed(ProbeError::Transport { .. })
        ));
        assert!(matches!(
            search_index(&client, &uri, "GARBAGE", "x/*", 5).await,
            SearchOutcome::Failed(ProbeError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_partition_does_not_stop_the_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/P1-index"))
            .respond_with(ResponseTemplate::new(200).set_body_string(three_lines()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/P2-index"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/P3-index"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(line("https://ru.wikipedia.org/wiki/D", 0)),
            )
            .mount(&server)
            .await;

        let config = SearchConfig {
            index_url: server.uri(),
            indexes: vec!["P1".into(), "P2".into(), "P3".into()],
            limit: 10,
            ..SearchConfig::default()
        };

        let (unique, reports) = search_partitions(&client(), &config).await;

        assert_eq!(unique.len(), 4);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].status, PartitionStatus::Records { count: 3 });
        assert!(matches!(reports[1].status, PartitionStatus::Failed { .. }));
        assert_eq!(reports[2].status, PartitionStatus::Records { count: 1 });
    }
}

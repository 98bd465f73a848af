// src/commoncrawl/record.rs
// =============================================================================
// Fetches one archived page out of a (multi-gigabyte) WARC file.
//
// The index tells us which file a capture lives in and at which byte offset.
// We ask the storage server for exactly those bytes with a Range header and
// then read the WARC record(s) we got back.
//
// Only a 206 Partial Content answer is accepted: a 200 means the server
// ignored our Range header and is about to send us the whole file.
// =============================================================================

use reqwest::{header::RANGE, Client, StatusCode};
use tracing::{debug, error};

use crate::config::join_url;
use crate::error::{ProbeError, Result};

use super::warc;

// Builds the inclusive HTTP byte range for `length` bytes at `offset`
//
// Example: offset=100, length=50 -> "bytes=100-149"
pub fn byte_range(offset: u64, length: u64) -> Result<String> {
    if length == 0 {
        return Err(ProbeError::InvalidRange { offset, length });
    }
    let end = offset
        .checked_add(length - 1)
        .ok_or(ProbeError::InvalidRange { offset, length })?;
    Ok(format!("bytes={}-{}", offset, end))
}

// Fetches a WARC record and returns the HTTP body of its response record
//
// Parameters:
//   client: shared HTTP client
//   data_url: base of the storage server (https://data.commoncrawl.org)
//   filename: path of the WARC file, as given by the index
//   offset, length: position of the record inside that file
//
// Returns: Some(body bytes), or None on any failure (already logged)
pub async fn fetch_single_record(
    client: &Client,
    data_url: &str,
    filename: &str,
    offset: u64,
    length: u64,
) -> Option<Vec<u8>> {
    match try_fetch_record(client, data_url, filename, offset, length).await {
        Ok(Some(payload)) => Some(payload),
        Ok(None) => {
            debug!(filename, offset, "No response record in fetched range");
            None
        }
        Err(e) => {
            error!(filename, offset, error = %e, "Failed to fetch WARC record");
            None
        }
    }
}

async fn try_fetch_record(
    client: &Client,
    data_url: &str,
    filename: &str,
    offset: u64,
    length: u64,
) -> Result<Option<Vec<u8>>> {
    let range = byte_range(offset, length)?;
    let url = join_url(data_url, filename)?;

    let response = client
        .get(url.clone())
        .header(RANGE, range.as_str())
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::PARTIAL_CONTENT {
        return Err(ProbeError::Transport {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await?;
    debug!(%url, %range, bytes = bytes.len(), "Fetched WARC range");

    warc::first_response_payload(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commoncrawl::warc::tests::{gzip, record};
    use std::time::Duration;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client() -> Client {
        crate::config::build_client(Duration::from_secs(5)).unwrap()
    }

    fn warc_body() -> Vec<u8> {
        let mut data = gzip(&record("request", b"GET /wiki/X HTTP/1.1\r\n\r\n"));
        data.extend(gzip(&record(
            "response",
            b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<title>Horse</title>",
        )));
        data
    }

    #[test]
    fn test_byte_range() {
        assert_eq!(byte_range(100, 50).unwrap(), "bytes=100-149");
        assert_eq!(byte_range(0, 1).unwrap(), "bytes=0-0");
    }

    #[test]
    fn test_zero_length_is_rejected() {
        assert!(matches!(
            byte_range(10, 0),
            Err(ProbeError::InvalidRange { offset: 10, length: 0 })
        ));
        assert!(byte_range(u64::MAX, 2).is_err());
    }

    #[tokio::test]
    async fn test_partial_content_returns_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/crawl-data/seg/a.warc.gz"))
            .and(header("range", "bytes=100-149"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(warc_body()))
            .mount(&server)
            .await;

        let payload =
            fetch_single_record(&client(), &server.uri(), "crawl-data/seg/a.warc.gz", 100, 50).await;
        assert_eq!(payload.as_deref(), Some(&b"<title>Horse</title>"[..]));
    }

    #[tokio::test]
    async fn test_full_content_status_is_rejected() {
        // Same well-formed body, but the server ignored the range
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(warc_body()))
            .mount(&server)
            .await;

        let payload = fetch_single_record(&client(), &server.uri(), "a.warc.gz", 0, 10).await;
        assert_eq!(payload, None);
    }

    #[tokio::test]
    async fn test_corrupt_body_returns_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"not a warc".to_vec()))
            .mount(&server)
            .await;

        let payload = fetch_single_record(&client(), &server.uri(), "a.warc.gz", 0, 10).await;
        assert_eq!(payload, None);
    }

    #[tokio::test]
    async fn test_zero_length_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(warc_body()))
            .expect(0)
            .mount(&server)
            .await;

        let payload = fetch_single_record(&client(), &server.uri(), "a.warc.gz", 0, 0).await;
        assert_eq!(payload, None);
    }
}

// src/commoncrawl/warc.rs
// =============================================================================
// A small reader for WARC (Web ARChive) files.
//
// A WARC file is a sequence of records. Each record looks like:
//
//   WARC/1.0\r\n
//   WARC-Type: response\r\n
//   Content-Length: 1234\r\n
//   ...more headers...\r\n
//   \r\n
//   <1234 bytes of content block>\r\n
//   \r\n
//
// Common Crawl compresses every record as its own gzip member, so a ranged
// fetch of one record is a complete gzip stream on its own. We only need
// to read records in order and pull the HTTP body out of a response record.
// =============================================================================

use std::io::{BufRead, BufReader, Read};

use flate2::read::{GzDecoder, MultiGzDecoder};
use tracing::debug;

use crate::error::{ProbeError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One parsed WARC record
#[derive(Debug, Clone)]
pub struct WarcRecord {
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub block: Vec<u8>,
}

impl WarcRecord {
    /// Header lookup, case-insensitive like HTTP headers
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The WARC-Type header: response, request, metadata, warcinfo...
    pub fn warc_type(&self) -> Option<&str> {
        self.header("WARC-Type")
    }

    pub fn is_response(&self) -> bool {
        self.warc_type()
            .map(|t| t.eq_ignore_ascii_case("response"))
            .unwrap_or(false)
    }
}

/// Iterates the records of a WARC stream
pub struct WarcReader<R: BufRead> {
    reader: R,
    done: bool,
}

impl<R: BufRead> WarcReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, done: false }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut raw = Vec::new();
        let n = self.reader.read_until(b'\n', &mut raw)?;
        if n == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn next_record(&mut self) -> Result<Option<WarcRecord>> {
        // Skip the blank separator lines left over from the previous record
        let version = loop {
            match self.read_line()? {
                None => return Ok(None),
                Some(line) if line.is_empty() => continue,
                Some(line) => break line,
            }
        };

        if !version.starts_with("WARC/") {
            return Err(ProbeError::Parse(format!(
                "expected WARC version line, found '{}'",
                truncate(&version, 40)
            )));
        }

        let mut headers = Vec::new();
        loop {
            match self.read_line()? {
                None => return Err(ProbeError::Parse("unexpected end of WARC headers".into())),
                Some(line) if line.is_empty() => break,
                Some(line) => {
                    let (name, value) = line.split_once(':').ok_or_else(|| {
                        ProbeError::Parse(format!("malformed WARC header '{}'", truncate(&line, 40)))
                    })?;
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                }
            }
        }

        let length: u64 = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
            .ok_or_else(|| ProbeError::Parse("WARC record without Content-Length".into()))?
            .1
            .parse()
            .map_err(|e| ProbeError::Parse(format!("bad WARC Content-Length: {}", e)))?;

        let mut block = Vec::new();
        (&mut self.reader).take(length).read_to_end(&mut block)?;
        if (block.len() as u64) < length {
            return Err(ProbeError::Parse(format!(
                "truncated WARC record: expected {} bytes, got {}",
                length,
                block.len()
            )));
        }

        Ok(Some(WarcRecord {
            version,
            headers,
            block,
        }))
    }
}

impl<R: BufRead> Iterator for WarcReader<R> {
    type Item = Result<WarcRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // A broken record leaves the stream position undefined
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Opens raw bytes as a WARC stream, gunzipping when needed
pub fn reader_for(bytes: &[u8]) -> WarcReader<Box<dyn BufRead + '_>> {
    let inner: Box<dyn BufRead + '_> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(BufReader::new(MultiGzDecoder::new(bytes)))
    } else {
        Box::new(bytes)
    };
    WarcReader::new(inner)
}

// Scans the records in order and returns the HTTP body of the first
// response record. Request, metadata and warcinfo records are skipped.
pub fn first_response_payload(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    for record in reader_for(bytes) {
        let record = record?;
        if record.is_response() {
            return Ok(Some(http_payload(&record.block)));
        }
        debug!(warc_type = ?record.warc_type(), "Skipping WARC record");
    }
    Ok(None)
}

// Strips the HTTP status line and headers from a response block.
// Chunked and gzip bodies are decoded; if decoding fails the raw body
// is returned unchanged.
pub fn http_payload(block: &[u8]) -> Vec<u8> {
    let Some((head, body)) = split_http_message(block) else {
        return block.to_vec();
    };

    let head = String::from_utf8_lossy(head);
    let header = |name: &str| {
        head.lines()
            .skip(1)
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim().to_ascii_lowercase())
    };

    let mut payload = body.to_vec();

    if header("Transfer-Encoding").is_some_and(|v| v.contains("chunked")) {
        match dechunk(&payload) {
            Some(decoded) => payload = decoded,
            None => debug!("Body is not valid chunked encoding, keeping it raw"),
        }
    }

    if header("Content-Encoding").is_some_and(|v| v.contains("gzip")) {
        let mut decoded = Vec::new();
        match GzDecoder::new(payload.as_slice()).read_to_end(&mut decoded) {
            Ok(_) => payload = decoded,
            Err(e) => debug!(error = %e, "Body is not valid gzip, keeping it raw"),
        }
    }

    payload
}

fn split_http_message(block: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(pos) = find(block, b"\r\n\r\n") {
        return Some((&block[..pos], &block[pos + 4..]));
    }
    find(block, b"\n\n").map(|pos| (&block[..pos], &block[pos + 2..]))
}

fn dechunk(mut data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let line_end = find(data, b"\r\n")?;
        let size_str = std::str::from_utf8(&data[..line_end]).ok()?;
        let size_str = size_str.split(';').next()?.trim();
        let size = usize::from_str_radix(size_str, 16).ok()?;
        data = &data[line_end + 2..];

        if size == 0 {
            return Some(out);
        }
        if data.len() < size {
            return None;
        }
        out.extend_from_slice(&data[..size]);
        data = data[size..].strip_prefix(b"\r\n")?;
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

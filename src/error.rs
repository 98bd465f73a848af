// src/error.rs
// =============================================================================
// The error type shared by both pipelines.
//
// Every network or parse step returns Result<T, ProbeError>. The callers
// nearest to each step log the error and turn it into an empty result, so
// only configuration problems (bad patterns, bad limits) ever reach main.
//
// Variants follow the three failure families we care about:
// - Transport: the server answered with a status we don't accept
// - Parse: the body was not the JSON/WARC/HTML we expected
// - ContentAbsent: the body parsed fine but the field we need is missing
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// Server answered, but not with the status we wanted
    #[error("unexpected HTTP status {status} from {url}")]
    Transport { url: String, status: StatusCode },

    /// Connection, timeout, or body read failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("content missing: {0}")]
    ContentAbsent(String),

    #[error("invalid byte range: offset {offset}, length {length}")]
    InvalidRange { offset: u64, length: u64 },

    #[error("invalid keyword pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("graph rendering failed: {0}")]
    Render(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ProbeError {
    fn from(e: serde_json::Error) -> Self {
        ProbeError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

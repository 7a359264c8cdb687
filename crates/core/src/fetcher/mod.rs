//! Artifact download.

mod http;
mod traits;

pub use http::HttpArtifactFetcher;
pub use traits::{ArtifactFetcher, FetchOutcome, FetchOutcomeKind};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching an artifact.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected content type '{content_type}': {excerpt}")]
    UnexpectedContentType {
        content_type: String,
        excerpt: String,
    },

    #[error("Size mismatch: expected {expected} bytes, received {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("Transfer interrupted: {0}")]
    Transfer(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::ConnectionFailed(e.to_string())
        } else {
            FetchError::Transfer(e.to_string())
        }
    }
}

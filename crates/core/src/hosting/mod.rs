//! Video hosting service.

mod http;

pub use http::HttpHostingClient;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::WorkItem;

/// Errors that can occur when talking to the hosting service.
#[derive(Debug, Error)]
pub enum HostingError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Hosting API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upload session was not opened: {0}")]
    NoUploadSession(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single video upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy: String,
    /// Scheduled publication instant.
    pub publish_at: Option<DateTime<Utc>>,
}

impl UploadRequest {
    /// Build an upload for `item`, whose media lives at `path`.
    pub fn for_item(item: &WorkItem, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: item.title.clone(),
            description: item.description.clone(),
            tags: item.tags.clone(),
            category_id: item.category_id.clone(),
            privacy: item.privacy.clone(),
            publish_at: item.publish_at,
        }
    }
}

/// What the hosting service reported after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub video_id: String,
    pub publish_at: Option<DateTime<Utc>>,
}

/// Remote video hosting.
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Upload one video with its metadata and publication time.
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, HostingError>;

    /// Latest publish instant among recent private scheduled videos.
    async fn latest_scheduled_publish(&self) -> Result<Option<DateTime<Utc>>, HostingError>;
}

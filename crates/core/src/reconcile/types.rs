//! Request and report types for reconciliation.

use serde::{Deserialize, Serialize};

use crate::matcher::Resolution;
use crate::store::WorkItem;

/// Result of submitting a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReport {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    /// File name of the item recorded alongside the task, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// State of a submitted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollStatus {
    Running,
    Done(Resolution),
}

/// Download an artifact, optionally recording its metadata first.
///
/// Every field is optional; whatever is missing is looked up in the store or
/// the generation feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<WorkItem>,
    /// Correlation id to search the feed for when no URL is known.
    #[serde(default)]
    pub unique_id_lookup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded { bytes: u64, sha256: String },
    SkippedExisting { bytes: u64 },
    Failed { error: String },
    /// No URL could be found; only the metadata was recorded.
    MetadataOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub status: DownloadStatus,
}

//! Types for the scheduling orchestrator.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{ItemStage, WorkItem};

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No hosting service is configured.
    #[error("hosting service is not configured")]
    HostingNotConfigured,

    /// No item with this file name in the store.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// The item is live on the hosting service and can no longer change.
    #[error("item already uploaded: {0}")]
    AlreadyUploaded(String),

    /// The stored name would resolve outside the media directory.
    #[error("unsafe file name: {0}")]
    UnsafeFileName(String),

    /// The item exists but its media file does not.
    #[error("media file missing: {0}")]
    MissingFile(String),

    /// The hosting service rejected an upload.
    #[error("upload failed: {0}")]
    Upload(#[from] crate::hosting::HostingError),

    /// Item store error.
    #[error("item store error: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// Coarse classification used to decide how callers react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Fatal until the configuration is fixed.
    Configuration,
    /// Missing item or file; the item stays pending.
    NotFound,
    /// Network or integrity failure; retry by re-invocation.
    Transfer,
    /// Hosting rejection; no partial mutation was committed.
    Upload,
    /// The request conflicts with the item's current stage.
    Conflict,
    /// The request itself is malformed.
    InvalidRequest,
    /// The item store could not be read or written.
    Storage,
}

impl OrchestratorError {
    pub fn category(&self) -> ErrorCategory {
        use crate::hosting::HostingError;

        match self {
            OrchestratorError::HostingNotConfigured => ErrorCategory::Configuration,
            OrchestratorError::ItemNotFound(_) | OrchestratorError::MissingFile(_) => {
                ErrorCategory::NotFound
            }
            OrchestratorError::AlreadyUploaded(_) => ErrorCategory::Conflict,
            OrchestratorError::UnsafeFileName(_) => ErrorCategory::InvalidRequest,
            OrchestratorError::Upload(
                HostingError::Timeout | HostingError::ConnectionFailed(_) | HostingError::Io { .. },
            ) => ErrorCategory::Transfer,
            OrchestratorError::Upload(HostingError::Client(_)) => ErrorCategory::Configuration,
            OrchestratorError::Upload(_) => ErrorCategory::Upload,
            OrchestratorError::Store(_) => ErrorCategory::Storage,
        }
    }
}

/// Options for a batch scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Start from this calendar date's first slot (reference zone).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Maximum successful uploads; the configured default when unset.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// What happened to one item during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    Uploaded {
        publish_at: Option<DateTime<Utc>>,
        video_id: String,
        archived: bool,
    },
    SkippedMissingFile,
    SkippedUnsafeName,
    UploadFailed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    /// Latest committed publish instant the run started after.
    pub baseline: Option<DateTime<Utc>>,
    /// First slot the clock pointed at.
    pub start_slot: DateTime<Utc>,
    pub limit: usize,
    /// Successful uploads.
    pub processed: usize,
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::UploadFailed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.items
            .iter()
            .filter(|r| r.outcome == ItemOutcome::SkippedMissingFile)
            .count()
    }
}

/// Operator request to pin one item to a publish time and upload it now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualScheduleRequest {
    pub file_name: String,
    /// Wall-clock time in the reference zone.
    pub publish_at_local: NaiveDateTime,
    /// Whether later runs schedule after this item.
    #[serde(default)]
    pub count_in_baseline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualScheduleReport {
    pub file_name: String,
    pub publish_at: DateTime<Utc>,
    pub video_id: String,
    pub archived: bool,
}

/// Whether an item's media file is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    Available,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub file_name: String,
    pub title: String,
    pub stage: ItemStage,
    pub file_status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<DateTime<Utc>>,
}

impl ItemSummary {
    pub fn new(item: &WorkItem, file_status: FileStatus) -> Self {
        Self {
            unique_id: item.unique_id.clone(),
            file_name: item.file_name.clone(),
            title: item.title.clone(),
            stage: item.stage(),
            file_status,
            publish_at: item.publish_at,
        }
    }
}

/// Snapshot of the backlog.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleStatus {
    pub pending_count: usize,
    /// Pending items the next run will place on the slot grid.
    pub automatic: Vec<ItemSummary>,
    /// Pending items pinned by an operator.
    pub manual: Vec<ItemSummary>,
    pub next_slot: DateTime<Utc>,
    /// `next_slot` as "YYYY-MM-DD HH:MM" in the reference zone.
    pub next_slot_local: String,
}

//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external service trait,
//! so scheduling and reconciliation can be exercised without real services.
//!
//! # Example
//!
//! ```rust,ignore
//! use skyforge_core::testing::{MockArchiver, MockHostingService};
//!
//! let hosting = MockHostingService::new();
//! let archiver = MockArchiver::new();
//!
//! // Configure mock responses
//! hosting.fail_uploads_for("broken.mp4").await;
//!
//! // Build a SchedulingOrchestrator with them...
//! ```

mod mock_archiver;
mod mock_fetcher;
mod mock_generation;
mod mock_hosting;

pub use mock_archiver::MockArchiver;
pub use mock_fetcher::{MockArtifactFetcher, RecordedFetch};
pub use mock_generation::MockGenerationService;
pub use mock_hosting::MockHostingService;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use chrono::{DateTime, Utc};

    use crate::matcher::CompletionRecord;
    use crate::store::WorkItem;

    /// Kind used by the default matcher config for finished generations.
    pub const COMPLETE_KIND: &str = "sora_gen_complete";

    /// Create a pending work item with a title derived from the file name.
    pub fn work_item(file_name: &str) -> WorkItem {
        WorkItem::new(file_name).with_title(format!("Title of {}", file_name))
    }

    /// Create a manual item pinned to `publish_at`.
    pub fn manual_item(file_name: &str, publish_at: DateTime<Utc>, ignore_calc: bool) -> WorkItem {
        let mut item = work_item(file_name).with_publish_at(publish_at);
        item.is_manual = true;
        item.ignore_calc = ignore_calc;
        item
    }

    /// Create an already-uploaded item.
    pub fn uploaded_item(file_name: &str, publish_at: DateTime<Utc>) -> WorkItem {
        let mut item = work_item(file_name).with_publish_at(publish_at);
        item.uploaded = true;
        item
    }

    /// Create a completed feed record.
    pub fn completion(id: &str, display_text: &str, task_id: Option<&str>, url: Option<&str>) -> CompletionRecord {
        CompletionRecord {
            id: id.to_string(),
            kind: COMPLETE_KIND.to_string(),
            display_text: display_text.to_string(),
            task_id: task_id.map(String::from),
            url: url.map(String::from),
        }
    }

    /// A download URL carrying `key` in its `files/<key>/` segment.
    pub fn artifact_url(key: &str) -> String {
        format!("https://videos.example.com/az/files/{}/raw", key)
    }

    /// Write a media file large enough to count as complete.
    pub fn media_file(dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, vec![1u8; 2048]).expect("write media fixture");
        path
    }
}

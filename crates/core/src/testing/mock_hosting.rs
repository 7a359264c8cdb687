//! Mock hosting service for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::hosting::{HostingError, HostingService, UploadReceipt, UploadRequest};

/// Mock implementation of the HostingService trait.
///
/// Provides controllable behavior for testing:
/// - Record every accepted upload
/// - Fail uploads for specific file names, or the next upload only
/// - Report a configurable latest scheduled publish time
///
/// # Example
///
/// ```rust,ignore
/// use skyforge_core::testing::MockHostingService;
///
/// let hosting = MockHostingService::new();
/// hosting.fail_uploads_for("broken.mp4").await;
/// hosting.set_latest_scheduled(Some(at)).await;
///
/// // Run the orchestrator...
///
/// assert_eq!(hosting.upload_count().await, 2);
/// ```
#[derive(Debug)]
pub struct MockHostingService {
    uploads: Arc<RwLock<Vec<UploadRequest>>>,
    latest: Arc<RwLock<Option<DateTime<Utc>>>>,
    failing_files: Arc<RwLock<HashSet<String>>>,
    /// If set, the next upload will fail with this error.
    next_error: Arc<RwLock<Option<HostingError>>>,
    latest_fails: Arc<RwLock<bool>>,
}

impl Default for MockHostingService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHostingService {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            latest: Arc::new(RwLock::new(None)),
            failing_files: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            latest_fails: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all accepted uploads, in order.
    pub async fn recorded_uploads(&self) -> Vec<UploadRequest> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// File names (without directory) of accepted uploads, in order.
    pub async fn uploaded_file_names(&self) -> Vec<String> {
        self.uploads
            .read()
            .await
            .iter()
            .filter_map(|r| r.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    pub async fn set_latest_scheduled(&self, at: Option<DateTime<Utc>>) {
        *self.latest.write().await = at;
    }

    /// Make the latest-scheduled query fail.
    pub async fn set_latest_fails(&self, fails: bool) {
        *self.latest_fails.write().await = fails;
    }

    /// Reject every upload of `file_name`.
    pub async fn fail_uploads_for(&self, file_name: &str) {
        self.failing_files.write().await.insert(file_name.to_string());
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: HostingError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl HostingService for MockHostingService {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, HostingError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let file_name = request
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_files.read().await.contains(&file_name) {
            return Err(HostingError::Api {
                status: 400,
                message: format!("mock rejected {}", file_name),
            });
        }

        let mut uploads = self.uploads.write().await;
        uploads.push(request.clone());
        Ok(UploadReceipt {
            video_id: format!("mock-video-{}", uploads.len()),
            publish_at: request.publish_at,
        })
    }

    async fn latest_scheduled_publish(&self) -> Result<Option<DateTime<Utc>>, HostingError> {
        if *self.latest_fails.read().await {
            return Err(HostingError::ConnectionFailed("mock offline".to_string()));
        }
        Ok(*self.latest.read().await)
    }
}

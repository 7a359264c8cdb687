//! Mock archiver for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::archive::{ArchiveError, Archiver};

/// Mock implementation of the Archiver trait.
///
/// Records archived paths without touching the filesystem.
#[derive(Debug)]
pub struct MockArchiver {
    archived: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next archive will fail with this error.
    next_error: Arc<RwLock<Option<ArchiveError>>>,
}

impl Default for MockArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArchiver {
    pub fn new() -> Self {
        Self {
            archived: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn recorded_archives(&self) -> Vec<PathBuf> {
        self.archived.read().await.clone()
    }

    pub async fn set_next_error(&self, error: ArchiveError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Archiver for MockArchiver {
    async fn archive(&self, source: &Path) -> Result<PathBuf, ArchiveError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.archived.write().await.push(source.to_path_buf());
        Ok(PathBuf::from("archive").join(source.file_name().unwrap_or_default()))
    }
}

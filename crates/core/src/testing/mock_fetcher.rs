//! Mock artifact fetcher for testing.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{ArtifactFetcher, FetchError, FetchOutcome};

/// A recorded fetch for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub url: String,
    pub destination: PathBuf,
}

/// Mock implementation of the ArtifactFetcher trait.
///
/// Writes a fixed payload to the destination unless the URL was marked as
/// failing. Honors the same skip-existing rule as the HTTP fetcher.
#[derive(Debug)]
pub struct MockArtifactFetcher {
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    failing_urls: Arc<RwLock<HashSet<String>>>,
    payload: Arc<RwLock<Vec<u8>>>,
}

impl Default for MockArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArtifactFetcher {
    pub fn new() -> Self {
        Self {
            fetches: Arc::new(RwLock::new(Vec::new())),
            failing_urls: Arc::new(RwLock::new(HashSet::new())),
            payload: Arc::new(RwLock::new(vec![0u8; 4096])),
        }
    }

    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    pub async fn fail_url(&self, url: &str) {
        self.failing_urls.write().await.insert(url.to_string());
    }

    pub async fn set_payload(&self, payload: Vec<u8>) {
        *self.payload.write().await = payload;
    }
}

#[async_trait]
impl ArtifactFetcher for MockArtifactFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome {
        if let Ok(meta) = tokio::fs::metadata(destination).await {
            if meta.len() > 1024 {
                return FetchOutcome::SkippedExisting { bytes: meta.len() };
            }
        }

        self.fetches.write().await.push(RecordedFetch {
            url: url.to_string(),
            destination: destination.to_path_buf(),
        });

        if self.failing_urls.read().await.contains(url) {
            return FetchOutcome::Failed(FetchError::HttpStatus {
                status: 403,
                body: "mock failure".to_string(),
            });
        }

        let payload = self.payload.read().await.clone();
        if let Err(e) = tokio::fs::write(destination, &payload).await {
            return FetchOutcome::Failed(FetchError::io(destination, e));
        }
        FetchOutcome::Downloaded {
            bytes: payload.len() as u64,
            sha256: format!("{:x}", Sha256::digest(&payload)),
        }
    }
}

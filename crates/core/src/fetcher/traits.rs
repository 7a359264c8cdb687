//! Trait definitions for the fetcher module.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use super::FetchError;

/// Result of a single fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The artifact was transferred and written to the destination.
    Downloaded { bytes: u64, sha256: String },
    /// A complete-looking file was already present; nothing was transferred.
    SkippedExisting { bytes: u64 },
    /// Nothing is left at the destination.
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn kind(&self) -> FetchOutcomeKind {
        match self {
            FetchOutcome::Downloaded { .. } => FetchOutcomeKind::Downloaded,
            FetchOutcome::SkippedExisting { .. } => FetchOutcomeKind::SkippedExisting,
            FetchOutcome::Failed(_) => FetchOutcomeKind::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, FetchOutcome::Failed(_))
    }
}

/// Outcome discriminant, for reporting and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcomeKind {
    Downloaded,
    SkippedExisting,
    Failed,
}

impl FetchOutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchOutcomeKind::Downloaded => "downloaded",
            FetchOutcomeKind::SkippedExisting => "skipped_existing",
            FetchOutcomeKind::Failed => "failed",
        }
    }
}

/// Downloads a remote artifact into a local file.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch `url` into `destination`.
    ///
    /// Never leaves a partial file behind; every failure is reported through
    /// [`FetchOutcome::Failed`].
    async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome;
}

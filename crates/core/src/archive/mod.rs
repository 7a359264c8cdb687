//! Relocation of uploaded media into the archive directory.

mod fs_archiver;

pub use fs_archiver::FsArchiver;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while archiving a file.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

/// Moves a file out of the media backlog after a successful upload.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Move `source` into the archive, returning its new location.
    async fn archive(&self, source: &Path) -> Result<PathBuf, ArchiveError>;
}

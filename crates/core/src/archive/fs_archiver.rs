//! Filesystem archiver.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::{ArchiveError, Archiver};

/// Moves files into a fixed archive directory, keeping their names.
pub struct FsArchiver {
    archive_dir: PathBuf,
}

impl FsArchiver {
    pub fn new(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
        }
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Rename, reporting `false` when source and destination are on
    /// different filesystems.
    async fn try_rename(source: &Path, destination: &Path) -> Result<bool, std::io::Error> {
        match fs::rename(source, destination).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn copy_then_remove(source: &Path, destination: &Path) -> Result<(), std::io::Error> {
        if let Err(e) = fs::copy(source, destination).await {
            let _ = fs::remove_file(destination).await;
            return Err(e);
        }
        fs::remove_file(source).await
    }
}

#[async_trait]
impl Archiver for FsArchiver {
    async fn archive(&self, source: &Path) -> Result<PathBuf, ArchiveError> {
        let file_name = source.file_name().ok_or_else(|| ArchiveError::SourceNotFound {
            path: source.to_path_buf(),
        })?;

        match fs::metadata(source).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(ArchiveError::SourceNotFound {
                    path: source.to_path_buf(),
                })
            }
        }

        fs::create_dir_all(&self.archive_dir)
            .await
            .map_err(|e| ArchiveError::DirectoryCreationFailed {
                path: self.archive_dir.clone(),
                source: e,
            })?;

        let destination = self.archive_dir.join(file_name);
        let move_failed = |error| ArchiveError::MoveFailed {
            source: source.to_path_buf(),
            destination: destination.clone(),
            error,
        };

        let renamed = Self::try_rename(source, &destination)
            .await
            .map_err(move_failed)?;
        if !renamed {
            debug!(source = %source.display(), "Cross-filesystem archive, copying");
            Self::copy_then_remove(source, &destination)
                .await
                .map_err(move_failed)?;
        }

        info!(
            source = %source.display(),
            destination = %destination.display(),
            "Archived uploaded file"
        );
        Ok(destination)
    }
}

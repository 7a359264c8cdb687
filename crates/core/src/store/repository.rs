//! Item repository trait and whole-collection operations.
//!
//! Callers load the full collection, mutate it in memory and save it back.
//! There is no field-level update path, so a crash between load and save
//! loses only the in-flight change.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::WorkItem;

/// Error type for item store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to serialize items: {0}")]
    Serialize(String),

    #[error("duplicate file name in store: {0}")]
    DuplicateFileName(String),

    #[error("work item has no file name")]
    MissingFileName,

    #[error("file name must be a bare name inside the media directory: {0}")]
    UnsafeFileName(String),

    #[error("item already uploaded: {0}")]
    AlreadyUploaded(String),
}

/// Durable storage for the work item collection.
pub trait ItemRepository: Send + Sync {
    /// Load every item in store order. A store that does not exist yet is empty.
    fn load(&self) -> Result<Vec<WorkItem>, StoreError>;

    /// Atomically replace the whole collection.
    fn save(&self, items: &[WorkItem]) -> Result<(), StoreError>;
}

/// Result of merging an item into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(usize),
    Updated(usize),
}

impl UpsertOutcome {
    pub fn index(&self) -> usize {
        match self {
            UpsertOutcome::Inserted(i) | UpsertOutcome::Updated(i) => *i,
        }
    }
}

/// Reject collections that break the one-entry-per-file-name rule.
pub fn ensure_unique_file_names(items: &[WorkItem]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.file_name.as_str()) {
            return Err(StoreError::DuplicateFileName(item.file_name.clone()));
        }
    }
    Ok(())
}

/// Accept only a plain file name: no separators, no `..`, no root.
pub fn validate_file_name(file_name: &str) -> Result<(), StoreError> {
    if file_name.trim().is_empty() {
        return Err(StoreError::MissingFileName);
    }
    if file_name.contains(['/', '\\'])
        || Path::new(file_name).file_name() != Some(OsStr::new(file_name))
    {
        return Err(StoreError::UnsafeFileName(file_name.to_string()));
    }
    Ok(())
}

/// Merge `incoming` into `items`.
///
/// The existing entry is found by correlation id first, then by file name.
/// A stored download URL survives when `incoming` carries none; a supplied
/// URL always wins. Uploaded entries are terminal and refuse the merge.
pub fn upsert_item(items: &mut Vec<WorkItem>, mut incoming: WorkItem) -> Result<UpsertOutcome, StoreError> {
    validate_file_name(&incoming.file_name)?;

    let by_id = incoming
        .unique_id
        .as_deref()
        .and_then(|id| items.iter().position(|v| v.has_unique_id(id)));
    let target = by_id.or_else(|| items.iter().position(|v| v.file_name == incoming.file_name));

    match target {
        Some(index) => {
            let clash = items
                .iter()
                .enumerate()
                .any(|(i, v)| i != index && v.file_name == incoming.file_name);
            if clash {
                return Err(StoreError::DuplicateFileName(incoming.file_name));
            }
            if items[index].uploaded {
                return Err(StoreError::AlreadyUploaded(items[index].file_name.clone()));
            }

            if incoming.download_url.is_none() {
                incoming.download_url = items[index].download_url.take();
            }
            items[index] = incoming;
            Ok(UpsertOutcome::Updated(index))
        }
        None => {
            items.push(incoming);
            Ok(UpsertOutcome::Inserted(items.len() - 1))
        }
    }
}

/// Remove the item with `file_name`, returning it.
pub fn remove_item(items: &mut Vec<WorkItem>, file_name: &str) -> Option<WorkItem> {
    let index = items.iter().position(|v| v.file_name == file_name)?;
    Some(items.remove(index))
}

pub fn find_item<'a>(items: &'a [WorkItem], file_name: &str) -> Option<&'a WorkItem> {
    items.iter().find(|v| v.file_name == file_name)
}

pub fn find_item_mut<'a>(items: &'a mut [WorkItem], file_name: &str) -> Option<&'a mut WorkItem> {
    items.iter_mut().find(|v| v.file_name == file_name)
}

pub fn find_by_unique_id<'a>(items: &'a mut [WorkItem], unique_id: &str) -> Option<&'a mut WorkItem> {
    items.iter_mut().find(|v| v.has_unique_id(unique_id))
}

//! JSON-file-backed item repository.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::repository::{ensure_unique_file_names, ItemRepository, StoreError};
use super::types::WorkItem;
use crate::metrics;

/// Item repository persisted as a pretty-printed JSON array.
///
/// Saves write a sibling temp file and rename it over the target, so a crash
/// mid-save leaves the previous file intact.
pub struct JsonFileRepository {
    path: PathBuf,
    // Serializes writers within this process.
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
    }
}

impl ItemRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<WorkItem>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<WorkItem> = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %self.path.display(), count = items.len(), "Loaded work items");
        Ok(items)
    }

    fn save(&self, items: &[WorkItem]) -> Result<(), StoreError> {
        ensure_unique_file_names(items)?;

        let json =
            serde_json::to_vec_pretty(items).map_err(|e| StoreError::Serialize(e.to_string()))?;

        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        let written = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&temp, &self.path)) {
            let _ = fs::remove_file(&temp);
            metrics::STORE_SAVES.with_label_values(&["error"]).inc();
            return Err(self.io_error(e));
        }

        metrics::STORE_SAVES.with_label_values(&["ok"]).inc();
        debug!(path = %self.path.display(), count = items.len(), "Saved work items");
        Ok(())
    }
}

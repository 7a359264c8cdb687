//! In-memory item repository.

use std::sync::Mutex;

use super::repository::{ensure_unique_file_names, ItemRepository, StoreError};
use super::types::WorkItem;

/// Item repository held in process memory. Used by tests and dry runs.
#[derive(Default)]
pub struct InMemoryRepository {
    items: Mutex<Vec<WorkItem>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<WorkItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Snapshot of the current contents.
    pub fn snapshot(&self) -> Vec<WorkItem> {
        self.items.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl ItemRepository for InMemoryRepository {
    fn load(&self) -> Result<Vec<WorkItem>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, items: &[WorkItem]) -> Result<(), StoreError> {
        ensure_unique_file_names(items)?;
        *self.items.lock().unwrap_or_else(|p| p.into_inner()) = items.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let repo = InMemoryRepository::new();
        assert!(repo.load().unwrap().is_empty());
        repo.save(&[WorkItem::new("a.mp4")]).unwrap();
        assert_eq!(repo.load().unwrap()[0].file_name, "a.mp4");
    }

    #[test]
    fn test_rejected_save_keeps_previous_contents() {
        let repo = InMemoryRepository::with_items(vec![WorkItem::new("a.mp4")]);
        let bad = vec![WorkItem::new("b.mp4"), WorkItem::new("b.mp4")];
        assert!(repo.save(&bad).is_err());
        assert_eq!(repo.snapshot().len(), 1);
    }
}

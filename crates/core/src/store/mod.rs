//! Durable work item state.

mod json_store;
mod memory_store;
mod repository;
mod types;

pub use json_store::JsonFileRepository;
pub use memory_store::InMemoryRepository;
pub use repository::{
    ensure_unique_file_names, find_by_unique_id, find_item, find_item_mut, remove_item,
    upsert_item, validate_file_name, ItemRepository, StoreError, UpsertOutcome,
};
pub use types::{ItemStage, WorkItem};

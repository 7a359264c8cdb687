//! Work item API handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use skyforge_core::WorkItem;
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

/// Response for listing items
#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    pub items: Vec<WorkItem>,
    pub total: usize,
}

pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListItemsResponse>, ApiError> {
    let items = state.orchestrator().list_items()?;
    Ok(Json(ListItemsResponse {
        total: items.len(),
        items,
    }))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Json<WorkItem>, ApiError> {
    Ok(Json(state.orchestrator().get_item(&file_name)?))
}

/// Remove the record. The media file stays on disk.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Json<WorkItem>, ApiError> {
    let Some(_guard) = state.try_store_write() else {
        return Err(ApiError::store_busy());
    };
    Ok(Json(state.orchestrator().delete(&file_name)?))
}

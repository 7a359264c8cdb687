//! Generation reconciliation API handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use skyforge_core::{DownloadReport, DownloadRequest, PollStatus, SubmitReport, WorkItem};
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

/// Request body for submitting a prompt
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub prompt: String,
    /// Item to record as pending alongside the task
    #[serde(default)]
    pub metadata: Option<WorkItem>,
}

/// Query parameters for polling a task
#[derive(Debug, Deserialize)]
pub struct PollParams {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub added: usize,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitReport>, ApiError> {
    let reconciler = state
        .reconciler()
        .ok_or_else(ApiError::generation_not_configured)?;
    if body.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt is required"));
    }
    let Some(_guard) = state.try_store_write() else {
        return Err(ApiError::store_busy());
    };

    Ok(Json(reconciler.submit(&body.prompt, body.metadata).await?))
}

pub async fn poll(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PollParams>,
) -> Result<Json<PollStatus>, ApiError> {
    let reconciler = state
        .reconciler()
        .ok_or_else(ApiError::generation_not_configured)?;
    if params.task_id.is_empty() && params.prompt.is_empty() {
        return Err(ApiError::bad_request("task_id or prompt is required"));
    }

    Ok(Json(reconciler.poll(&params.task_id, &params.prompt).await?))
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Json<DownloadReport>, ApiError> {
    let reconciler = state
        .reconciler()
        .ok_or_else(ApiError::generation_not_configured)?;
    let Some(_guard) = state.try_store_write() else {
        return Err(ApiError::store_busy());
    };

    Ok(Json(reconciler.download(body).await?))
}

pub async fn sync(State(state): State<Arc<AppState>>) -> Result<Json<SyncResponse>, ApiError> {
    let reconciler = state
        .reconciler()
        .ok_or_else(ApiError::generation_not_configured)?;
    let Some(_guard) = state.try_store_write() else {
        return Err(ApiError::store_busy());
    };

    let added = reconciler.sync_feed().await?;
    Ok(Json(SyncResponse { added }))
}

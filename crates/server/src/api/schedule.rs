//! Scheduling API handlers.
//!
//! Each run type is single-flight: a request arriving while the same kind of
//! run is in progress gets `409 Conflict`.

use axum::{extract::State, Json};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use skyforge_core::{ManualScheduleReport, ManualScheduleRequest, RunOptions, RunReport};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

/// Accepted local timestamp layouts for manual scheduling.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Request body for a batch run
#[derive(Debug, Default, Deserialize)]
pub struct RunBody {
    /// Maximum successful uploads
    pub limit: Option<usize>,
    /// Start on this date's first slot (`YYYY-MM-DD`)
    pub date: Option<NaiveDate>,
}

/// Request body for a manual schedule
#[derive(Debug, Deserialize)]
pub struct ManualBody {
    pub file_name: String,
    /// Local time in the reference zone, e.g. `2025-11-27T20:30`
    pub publish_at: String,
    #[serde(default)]
    pub count_in_baseline: bool,
}

pub fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

pub async fn run_batch(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RunBody>>,
) -> Result<Json<RunReport>, ApiError> {
    let Json(body) = body.unwrap_or_default();
    let Some(_guard) = state.try_store_write() else {
        return Err(ApiError::store_busy());
    };

    info!(limit = ?body.limit, date = ?body.date, "Batch run requested");
    let report = state
        .orchestrator()
        .run(RunOptions {
            start_date: body.date,
            limit: body.limit,
        })
        .await?;
    Ok(Json(report))
}

pub async fn schedule_manual(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ManualBody>,
) -> Result<Json<ManualScheduleReport>, ApiError> {
    if body.file_name.trim().is_empty() {
        return Err(ApiError::bad_request("file_name is required"));
    }
    let publish_at_local = parse_local_time(&body.publish_at).ok_or_else(|| {
        ApiError::bad_request(format!("invalid publish_at: {}", body.publish_at))
    })?;
    let Some(_guard) = state.try_store_write() else {
        return Err(ApiError::store_busy());
    };

    let report = state
        .orchestrator()
        .manual_schedule(ManualScheduleRequest {
            file_name: body.file_name,
            publish_at_local,
            count_in_baseline: body.count_in_baseline,
        })
        .await?;
    Ok(Json(report))
}

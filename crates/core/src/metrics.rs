//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scheduling runs and uploads
//! - Artifact downloads
//! - Task matching
//! - Item store writes

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Scheduling
// =============================================================================

/// Scheduling runs by kind and result.
pub static SCHEDULE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyforge_schedule_runs_total", "Total scheduling runs"),
        &["kind", "result"], // kind: "batch", "manual"; result: "ok", "error"
    )
    .unwrap()
});

/// Uploads by result.
pub static UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyforge_uploads_total", "Total video uploads"),
        &["result"], // "ok", "failed"
    )
    .unwrap()
});

/// Upload duration in seconds.
pub static UPLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("skyforge_upload_duration_seconds", "Duration of video uploads")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Downloads
// =============================================================================

/// Artifact fetches by outcome.
pub static DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyforge_downloads_total", "Total artifact fetches"),
        &["outcome"], // "downloaded", "skipped_existing", "failed"
    )
    .unwrap()
});

/// Bytes written by successful downloads.
pub static DOWNLOADED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "skyforge_downloaded_bytes_total",
        "Total bytes written by artifact downloads",
    )
    .unwrap()
});

// =============================================================================
// Matching and store
// =============================================================================

/// Task match resolutions by tier.
pub static MATCH_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "skyforge_match_resolutions_total",
            "Task match resolutions by confidence tier",
        ),
        &["tier"], // "exact", "fuzzy", "fallback"
    )
    .unwrap()
});

/// Store file writes by result.
pub static STORE_SAVES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyforge_store_saves_total", "Total item store writes"),
        &["result"],
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SCHEDULE_RUNS.clone()),
        Box::new(UPLOADS.clone()),
        Box::new(UPLOAD_DURATION.clone()),
        Box::new(DOWNLOADS.clone()),
        Box::new(DOWNLOADED_BYTES.clone()),
        Box::new(MATCH_RESOLUTIONS.clone()),
        Box::new(STORE_SAVES.clone()),
    ]
}

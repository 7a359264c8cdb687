//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the SkyForge server:
//! - HTTP request metrics (latency, counts)
//! - Work items by lifecycle stage (collected dynamically)
//! - Core engine metrics (uploads, downloads, matching, store writes)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;
use skyforge_core::ItemStage;
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "skyforge_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("skyforge_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "skyforge_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Item Metrics (collected dynamically)
// =============================================================================

/// Work items by lifecycle stage.
pub static ITEMS_BY_STAGE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("skyforge_items_by_stage", "Current work item count by stage"),
        &["stage"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Items
    registry
        .register(Box::new(ITEMS_BY_STAGE.clone()))
        .unwrap();

    // Core metrics (scheduling, transfers, matching, store)
    for metric in skyforge_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Refresh gauges from the item store before encoding.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let items = match state.orchestrator().list_items() {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Could not read items for metrics");
            return;
        }
    };

    for stage in [ItemStage::Pending, ItemStage::Scheduled, ItemStage::Uploaded] {
        let count = items.iter().filter(|v| v.stage() == stage).count();
        ITEMS_BY_STAGE
            .with_label_values(&[stage.as_str()])
            .set(count as i64);
    }
}

static ITEM_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/items/[^/]+").unwrap());

/// Normalize a path for metric labels (file names become a placeholder).
pub fn normalize_path(path: &str) -> String {
    ITEM_PATH.replace_all(path, "/items/{file_name}").to_string()
}

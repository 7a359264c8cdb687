use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{generation, handlers, items, middleware::metrics_middleware, schedule};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        .route("/metrics", get(handlers::get_metrics))
        // Items
        .route("/items", get(items::list_items))
        .route(
            "/items/{file_name}",
            get(items::get_item).delete(items::delete_item),
        )
        // Scheduling
        .route("/schedule/run", post(schedule::run_batch))
        .route("/schedule/manual", post(schedule::schedule_manual))
        // Generation
        .route("/generation/submit", post(generation::submit))
        .route("/generation/poll", get(generation::poll))
        .route("/generation/download", post(generation::download))
        .route("/generation/sync", post(generation::sync))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

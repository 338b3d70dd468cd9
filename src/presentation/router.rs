use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, ingest_command, ingest_location, ingest_telemetry, stream_alerts,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/telemetry", post(ingest_telemetry))
        .route("/location", post(ingest_location))
        .route("/command", post(ingest_command))
        .route("/alerts/stream", get(stream_alerts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

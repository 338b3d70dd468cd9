// HTTP request handlers
use crate::application::monitor_service::MonitorStopped;
use crate::infrastructure::alert_stream::stream_from_broadcast;
use crate::infrastructure::event_codec::{
    CommandMessage, DecodedCommand, LocationMessage, TelemetryMessage,
};
use crate::presentation::app_state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Rejecting undecodable event: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string()).into_response()
    })
}

fn stopped(_: MonitorStopped) -> Response {
    tracing::error!("Event received after monitor stopped");
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

fn received_at() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Telemetry event. Events without a temperature are accepted and ignored.
pub async fn ingest_telemetry(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let message: TelemetryMessage = match decode(&body) {
        Ok(message) => message,
        Err(response) => return response,
    };

    match message.into_reading(received_at()) {
        Ok(reading) => match state.monitor.submit_telemetry(reading).await {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(e) => stopped(e),
        },
        Err(e) => {
            tracing::debug!("Ignoring event: {}", e);
            StatusCode::ACCEPTED.into_response()
        }
    }
}

pub async fn ingest_location(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let message: LocationMessage = match decode(&body) {
        Ok(message) => message,
        Err(response) => return response,
    };

    match message.into_sample(received_at()) {
        Ok(sample) => match state.monitor.update_location(sample) {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(e) => stopped(e),
        },
        Err(e) => {
            tracing::debug!("Ignoring event: {}", e);
            StatusCode::ACCEPTED.into_response()
        }
    }
}

pub async fn ingest_command(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let message: CommandMessage = match decode(&body) {
        Ok(message) => message,
        Err(response) => return response,
    };

    match message.into_command(received_at()) {
        Ok(DecodedCommand::Reboot(command)) => match state.monitor.submit_command(command).await {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(e) => stopped(e),
        },
        Ok(DecodedCommand::Ignored(command)) => {
            tracing::info!(command = %command, "Ignoring unsupported command");
            StatusCode::ACCEPTED.into_response()
        }
        Err(e) => {
            tracing::debug!("Ignoring event: {}", e);
            StatusCode::ACCEPTED.into_response()
        }
    }
}

/// Live feed of published alerts as newline-delimited JSON
pub async fn stream_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_broadcast(state.alert_feed.subscribe(), state.shutdown.clone())
}

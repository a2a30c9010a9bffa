// HTTP request handlers
use crate::domain::reading::SensorReading;
use crate::infrastructure::http_response::{error_response, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::dashboard_view::DashboardView;
use axum::{
    body::Body,
    extract::State,
    http::{Response, StatusCode},
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Serialize)]
pub struct IngestAccepted {
    pub message: &'static str,
    pub data: SensorReading,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current reading; falls back to the cache with an `error` field when the sensor is down
pub async fn get_reading(State(state): State<Arc<AppState>>) -> Response<Body> {
    let outcome = state.proxy.serve_reading().await;
    json_response(StatusCode::OK, &outcome)
}

/// Reading pushed by the sensor itself
pub async fn post_reading(State(state): State<Arc<AppState>>, body: Bytes) -> Response<Body> {
    let candidate: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Rejected push with unparseable body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e));
        }
    };

    match state.proxy.ingest(&candidate).await {
        Ok(reading) => json_response(
            StatusCode::OK,
            &IngestAccepted {
                message: "Data updated successfully",
                data: reading,
            },
        ),
        Err(e) => {
            tracing::warn!("Rejected push: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// Unknown paths still answer with a JSON body
pub async fn not_found() -> Response<Body> {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Display model of the built-in dashboard client
pub async fn dashboard_view(State(state): State<Arc<AppState>>) -> Response<Body> {
    match &state.dashboard {
        Some(client) => {
            let snapshot = client.snapshot().await;
            json_response(StatusCode::OK, &DashboardView::from(&snapshot))
        }
        None => error_response(StatusCode::NOT_FOUND, "Dashboard client is disabled"),
    }
}

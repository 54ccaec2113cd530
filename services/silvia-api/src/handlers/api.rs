//! Probes, health checks and metrics.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use geo_common::today_iso;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub today: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// GET /api/today - current UTC date as `YYYY-MM-DD`
pub async fn today_handler() -> Json<TodayResponse> {
    Json(TodayResponse { today: today_iso() })
}

/// GET /api/status
pub async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse { status: "active" })
}

/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

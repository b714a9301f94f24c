//! Health and Prometheus metrics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use services::{OrderGateway, SystemStatusService};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `None` when the status collaborator could not be reached.
    pub ordering_paused: Option<bool>,
}

/// GET /health: process health plus the storefront's ordering status.
pub async fn check<G: OrderGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<HealthResponse> {
    match state.status.ordering_paused().await {
        Ok(pause) => Json(HealthResponse {
            status: "ok",
            ordering_paused: Some(pause.paused),
        }),
        Err(err) => {
            tracing::warn!(error = %err, "status collaborator unreachable");
            Json(HealthResponse {
                status: "degraded",
                ordering_paused: None,
            })
        }
    }
}

/// GET /metrics: Prometheus text exposition.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}

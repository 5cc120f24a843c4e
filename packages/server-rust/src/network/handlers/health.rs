//! Health, liveness, and readiness endpoint handlers.
//!
//! These handlers expose server health information for orchestrators
//! (Kubernetes, load balancers) and operational monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::network::LifecycleState;

/// Returns detailed health information as JSON.
///
/// Always returns 200 -- the `state` field in the response body indicates
/// whether the server is actually accepting work.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let service = &state.service;

    Json(json!({
        "state": service.state().as_str(),
        "in_flight": service.in_flight_count(),
        "stored_results": service.stored_results(),
        "issued_handles": service.issued_handles(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "request_timeout_secs": state.config.request_timeout.as_secs(),
        "shutdown_timeout_secs": state.config.shutdown_timeout.as_secs(),
    }))
}

/// Kubernetes liveness probe -- always returns 200 OK.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe -- returns 200 while running, 503 otherwise.
///
/// Draining servers report 503 so no new traffic is routed to them while
/// outstanding jobs finish.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.service.state() == LifecycleState::Running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

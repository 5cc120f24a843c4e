//! Latency statistics endpoint.

use axum::extract::State;
use axum::Json;
use hashvault_core::AggregateStatus;

use super::AppState;

/// Handles `GET /stats`: `{"total": N, "average": M}`, where `total` counts
/// successful submissions and `average` is their mean accept latency in
/// microseconds.
pub async fn stats_handler(State(state): State<AppState>) -> Json<AggregateStatus> {
    Json(state.service.status_snapshot())
}

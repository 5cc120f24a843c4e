//! Shutdown trigger endpoint.

use axum::extract::State;
use tracing::info;

use super::AppState;

/// Handles `/shutdown`: starts the drain and answers immediately.
///
/// Repeated requests while already draining are accepted and ignored.
pub async fn shutdown_handler(State(state): State<AppState>) -> &'static str {
    if state.service.begin_shutdown() {
        info!("shutdown requested over HTTP");
    }
    "initiating shutdown"
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_state;
    use super::*;
    use crate::network::LifecycleState;

    #[tokio::test]
    async fn shutdown_moves_service_to_draining() {
        let state = test_state();
        assert_eq!(shutdown_handler(State(state.clone())).await, "initiating shutdown");
        assert_eq!(state.service.state(), LifecycleState::Draining);
    }

    #[tokio::test]
    async fn repeated_shutdown_is_harmless() {
        let state = test_state();
        shutdown_handler(State(state.clone())).await;
        assert_eq!(shutdown_handler(State(state.clone())).await, "initiating shutdown");
        assert_eq!(state.service.state(), LifecycleState::Draining);
    }
}

//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub(super) struct ReadinessResponse {
    pub status: &'static str,
    /// Configured backend variant
    pub backend: String,
    pub storage: &'static str,
    pub registry: &'static str,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - blob backend reachable and registry readable.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let backend = state.media.backend().backend_type().to_string();

    let response = match tokio::time::timeout(TIMEOUT, state.media.readiness()).await {
        Ok(readiness) => ReadinessResponse {
            status: if readiness.is_ready() { "ready" } else { "not_ready" },
            backend,
            storage: if readiness.storage { "ok" } else { "unavailable" },
            registry: if readiness.registry { "ok" } else { "unavailable" },
        },
        Err(_) => {
            tracing::error!("Readiness check timed out");
            ReadinessResponse {
                status: "not_ready",
                backend,
                storage: "timeout",
                registry: "timeout",
            }
        }
    };

    let status_code = if response.status == "ready" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

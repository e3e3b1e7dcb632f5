//! GET /health: provider health snapshot.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

/// Handler: GET /health
///
/// 200 when the oracle backend is reachable and the model exists, 503 otherwise.
/// The body carries the [`HealthStatus`] either way.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let status = state.llm().health().await;
    let code = if status.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ApiResponse::<HealthStatus>::success(status).into_response_with_status(code)
}

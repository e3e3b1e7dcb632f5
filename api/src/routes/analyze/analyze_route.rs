//! POST /analyze: runs the comment digest pipeline over an uploaded table.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use comment_digest::{AnalysisReport, CommentTable};
use tracing::info;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::analyze::analyze_request::AnalyzeRequest,
};

/// Handler: POST /analyze
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/analyze \
///   -H 'content-type: application/json' \
///   -d '{"rows":[{"comment":"とても分かりやすかった"},{"comment":"資料が分かりにくい"}]}'
/// ```
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AnalysisReport>>> {
    let Json(body) = payload?;
    info!(rows = body.rows.len(), "analyze: request received");

    let table = CommentTable::from_records(&body.rows)?;
    let report = state.pipeline.run(&table).await?;

    Ok(Json(ApiResponse::success(report)))
}

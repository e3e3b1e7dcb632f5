use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use comment_digest::{OracleError, SchemaError};
use thiserror::Error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Llm(#[from] ai_llm_service::AiLlmError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / pipeline ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) | AppError::Schema(_) => StatusCode::BAD_REQUEST,

            // upstream oracle
            AppError::Oracle(OracleError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Oracle(_) => StatusCode::BAD_GATEWAY,

            // 5xx, startup-only
            AppError::MissingEnv(_)
            | AppError::Llm(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Llm(_) => "LLM_CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Schema(_) => "SCHEMA_ERROR",
            AppError::Oracle(OracleError::InvalidReply { .. }) => "ORACLE_INVALID_REPLY",
            AppError::Oracle(OracleError::Timeout { .. }) => "ORACLE_TIMEOUT",
            AppError::Oracle(OracleError::Transport { .. }) => "ORACLE_TRANSPORT",
        }
    }

    fn stage(&self) -> Option<&'static str> {
        match self {
            AppError::Schema(_) => Some("extracting"),
            AppError::Oracle(e) => Some(e.stage().as_str()),
            _ => None,
        }
    }
}

impl From<comment_digest::Error> for AppError {
    fn from(err: comment_digest::Error) -> Self {
        match err {
            comment_digest::Error::Schema(e) => AppError::Schema(e),
            comment_digest::Error::Oracle(e) => AppError::Oracle(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.stage())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use comment_digest::Stage;

    use super::*;

    #[test]
    fn oracle_errors_map_to_gateway_statuses() {
        let timeout = AppError::Oracle(OracleError::Timeout {
            stage: Stage::Classifying,
            after: Duration::from_secs(1),
        });
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.error_code(), "ORACLE_TIMEOUT");
        assert_eq!(timeout.stage(), Some("classifying"));

        let invalid = AppError::Oracle(OracleError::InvalidReply {
            stage: Stage::Classifying,
            reason: "x".into(),
        });
        assert_eq!(invalid.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn schema_errors_are_bad_requests() {
        let e: AppError = comment_digest::Error::Schema(SchemaError::MissingColumn {
            column: "comment".into(),
        })
        .into();
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(e.error_code(), "SCHEMA_ERROR");
    }
}

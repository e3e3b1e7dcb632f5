use std::sync::Arc;

use ai_llm_service::{LlmService, config_from_env};
use comment_digest::{LlmOracle, Pipeline, PipelineConfig};
use tracing::info;

use crate::error_handler::AppError;

/// Health probe timeout for `GET /health`.
const HEALTH_TIMEOUT_SECS: u64 = 10;

/// Shared state for all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Comment digest pipeline over the configured LLM.
    pub pipeline: Pipeline<LlmOracle>,
}

impl AppState {
    pub fn new(llm: Arc<LlmService>, config: PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline::new(LlmOracle::new(llm), config),
        }
    }

    /// Load shared state from environment variables (`LLM_*`, provider vars, `DIGEST_*`).
    pub fn from_env() -> Result<Self, AppError> {
        let llm_cfg = config_from_env()?;
        let pipeline_cfg = PipelineConfig::from_env();
        info!(
            provider = %llm_cfg.provider,
            model = %llm_cfg.model,
            call_timeout = ?pipeline_cfg.call_timeout,
            partition = %pipeline_cfg.partition,
            concurrent = pipeline_cfg.concurrent_stages,
            "app state configured"
        );
        let llm = Arc::new(LlmService::new(llm_cfg, Some(HEALTH_TIMEOUT_SECS))?);
        Ok(Self::new(llm, pipeline_cfg))
    }

    pub fn llm(&self) -> &Arc<LlmService> {
        self.pipeline.oracle().service()
    }
}

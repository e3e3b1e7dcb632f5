//! Shared LLM service bound to one provider/model.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Dispatches to the provider client by enum; no trait objects.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{LlmModelConfig, LlmProvider, LlmService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = LlmModelConfig {
//!         provider: LlmProvider::Ollama,
//!         model: "qwen3:14b".into(),
//!         endpoint: "http://localhost:11434".into(),
//!         api_key: None,
//!         max_tokens: Some(512),
//!         temperature: Some(0.2),
//!         top_p: None,
//!         timeout_secs: Some(30),
//!     };
//!
//!     let svc = Arc::new(LlmService::new(cfg, Some(10))?);
//!     let txt = svc.generate("Return {\"ok\": true}", None).await?;
//!     println!("{txt}");
//!     println!("{:?}", svc.health().await);
//!     Ok(())
//! }
//! ```

use tracing::debug;

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::error_handler::AiLlmError;
use crate::health_service::{HealthService, HealthStatus};
use crate::services::{
    gemini_service::GeminiService, ollama_service::OllamaService, open_ai_service::OpenAiService,
};

#[derive(Debug)]
enum ProviderClient {
    Ollama(OllamaService),
    OpenAi(OpenAiService),
    Gemini(GeminiService),
}

/// Generation + health facade over the configured provider.
#[derive(Debug)]
pub struct LlmService {
    client: ProviderClient,
    health: HealthService,
}

impl LlmService {
    /// Validates `cfg`, builds the provider client and the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the config is invalid or a client cannot be built.
    pub fn new(cfg: LlmModelConfig, health_timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        cfg.validate()?;
        debug!(provider = %cfg.provider, model = %cfg.model, "building LLM client");

        let client = match cfg.provider {
            LlmProvider::Ollama => ProviderClient::Ollama(OllamaService::new(cfg)?),
            LlmProvider::OpenAI => ProviderClient::OpenAi(OpenAiService::new(cfg)?),
            LlmProvider::Gemini => ProviderClient::Gemini(GeminiService::new(cfg)?),
        };

        Ok(Self {
            client,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text for `prompt` with an optional system instruction.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails. A request that hits the
    /// client deadline is reported as [`AiLlmError::Timeout`] with the
    /// configured timeout.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let out = match &self.client {
            ProviderClient::Ollama(c) => c.generate(prompt, system).await,
            ProviderClient::OpenAi(c) => c.generate(prompt, system).await,
            ProviderClient::Gemini(c) => c.generate(prompt, system).await,
        };
        out.map_err(|e| {
            if e.is_timeout() {
                AiLlmError::Timeout(self.config().timeout())
            } else {
                e
            }
        })
    }

    /// Health snapshot of the configured backend.
    pub async fn health(&self) -> HealthStatus {
        self.health.check(self.config()).await
    }

    /// Config the service was built with.
    pub fn config(&self) -> &LlmModelConfig {
        match &self.client {
            ProviderClient::Ollama(c) => c.config(),
            ProviderClient::OpenAi(c) => c.config(),
            ProviderClient::Gemini(c) => c.config(),
        }
    }
}

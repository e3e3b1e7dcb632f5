//! Shared LLM access layer.
//!
//! - [`LlmService`]: one provider (Ollama, OpenAI or Gemini) behind a single
//!   `generate` call plus a health probe.
//! - [`config`]: [`LlmModelConfig`] and env-driven constructors.
//! - [`error_handler`]: the unified [`AiLlmError`].
//! - [`telemetry`]: crate-scoped `tracing` layer for binaries.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod telemetry;

pub use config::default_config::config_from_env;
pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use llm_service::LlmService;

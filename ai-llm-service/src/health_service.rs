//! Health probes for the configured LLM backend.
//!
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth (best-effort model existence check)
//! - Gemini: `GET {endpoint}/v1beta/models/{model}` with the API key header
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`).

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};
use crate::services::gemini_service::API_KEY_HEADER;

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "ollama", "gemini").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the main probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: cfg.provider.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client.
#[derive(Debug)]
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds, default 10).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self { client })
    }

    /// Checks health for a single LLM config, routing to the provider-specific probe.
    ///
    /// Never returns an error; any failure becomes `HealthStatus { ok: false, .. }`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.probe_openai(cfg).await,
            LlmProvider::Gemini => self.probe_gemini(cfg).await,
        };
        let latency = start.elapsed().as_millis();

        match result {
            Ok((ok, message)) => {
                info!(
                    provider = %cfg.provider,
                    model = %cfg.model,
                    ok,
                    latency_ms = latency,
                    "health probe completed"
                );
                HealthStatus::new(cfg, ok, latency, message)
            }
            Err(err) => {
                warn!(
                    provider = %cfg.provider,
                    model = %cfg.model,
                    latency_ms = latency,
                    error = %err,
                    "health probe failed"
                );
                HealthStatus::new(cfg, false, latency, err.to_string())
            }
        }
    }

    /// Sends the probe request and turns non-2xx answers into [`HealthError`].
    async fn get(
        &self,
        url: &str,
        cfg: &LlmModelConfig,
        auth: Option<(header::HeaderName, header::HeaderValue)>,
    ) -> Result<reqwest::Response, AiLlmError> {
        debug!(provider = %cfg.provider, "GET {}", url);
        let mut req = self.client.get(url);
        if let Some((name, value)) = auth {
            req = req.header(name, value);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })
            .into());
        }
        Ok(resp)
    }

    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        #[derive(Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        let url = format!("{}/api/tags", cfg.base_url());
        let resp = self.get(&url, cfg, None).await?;
        let tags: Tags = resp
            .json()
            .await
            .map_err(|e| HealthError::Decode(format!("/api/tags: {e}")))?;

        Ok(match tags.models {
            Some(models) if models.iter().any(|m| m.name == cfg.model) => {
                (true, "Ollama is healthy; model is available".into())
            }
            Some(_) => (false, "Ollama is up, but model not found in /api/tags".into()),
            None => (true, "Ollama is healthy; tags response without `models` field".into()),
        })
    }

    async fn probe_openai(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        #[derive(Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;
        let auth = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;

        let url = format!("{}/v1/models", cfg.base_url());
        let resp = self
            .get(&url, cfg, Some((header::AUTHORIZATION, auth)))
            .await?;
        let models: Models = resp
            .json()
            .await
            .map_err(|e| HealthError::Decode(format!("/v1/models: {e}")))?;

        Ok(if models.data.iter().any(|m| m.id == cfg.model) {
            (true, "OpenAI is healthy; model is available".into())
        } else {
            (false, "OpenAI is up, but model not found in /v1/models".into())
        })
    }

    async fn probe_gemini(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing Gemini API key".into()))?;
        let mut key = header::HeaderValue::from_str(api_key)
            .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
        key.set_sensitive(true);

        let url = format!("{}/v1beta/models/{}", cfg.base_url(), cfg.model);
        self.get(
            &url,
            cfg,
            Some((header::HeaderName::from_static(API_KEY_HEADER), key)),
        )
        .await?;

        Ok((true, "Gemini is healthy; model is available".into()))
    }
}

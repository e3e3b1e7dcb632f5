use std::time::Duration;

use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{
    AiLlmError, ConfigError, validate_http_endpoint, validate_range_f32,
};

/// Default HTTP timeout applied when `timeout_secs` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for an LLM model invocation.
///
/// The same struct drives every provider; provider-specific fields
/// (like `api_key`) are validated by the provider client at construction.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Gemini,
///     model: "gemini-1.5-flash-latest".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: Some("AIza...".to_string()),
///     max_tokens: Some(2048),
///     temperature: Some(0.2),
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string (e.g., `"gemini-1.5-flash-latest"`, `"qwen3:14b"`).
    pub model: String,

    /// Base URL of the inference API (no path suffix).
    pub endpoint: String,

    /// Optional API key for authenticated providers (OpenAI, Gemini).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Effective HTTP timeout for this config.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Validates model, endpoint and sampling parameters.
    ///
    /// # Errors
    /// Returns [`AiLlmError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), AiLlmError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", self.endpoint.trim())?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }

    /// Endpoint without trailing slashes, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "qwen3:14b".into(),
            endpoint: "http://localhost:11434/".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(cfg().base_url(), "http://localhost:11434");
    }

    #[test]
    fn default_timeout_applies() {
        assert_eq!(cfg().timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut c = cfg();
        c.model = "  ".into();
        assert!(c.validate().is_err());

        let mut c = cfg();
        c.endpoint = "localhost:11434".into();
        assert!(c.validate().is_err());

        let mut c = cfg();
        c.temperature = Some(3.5);
        assert!(c.validate().is_err());

        assert!(cfg().validate().is_ok());
    }
}

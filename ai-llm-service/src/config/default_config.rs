//! Default LLM configs loaded strictly from environment variables.
//!
//! The binary calls [`config_from_env`] once at startup and hands the result
//! to [`crate::LlmService::new`]; libraries never read the environment.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = `ollama` | `openai` | `gemini` (default `gemini`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional HTTP timeout (u64)
//!
//! Ollama: `OLLAMA_URL` or `OLLAMA_PORT` (mandatory), `OLLAMA_MODEL` (mandatory)
//!
//! OpenAI: `OPENAI_API_KEY` (mandatory), `OPENAI_MODEL`, `OPENAI_URL`
//!
//! Gemini: `GOOGLE_API_KEY` (mandatory), `GEMINI_MODEL`, `GEMINI_URL`

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt, env_opt_u32, env_opt_u64, must_env},
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// Classification replies are long JSON documents; keep sampling conservative.
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Builds the config for the provider selected by `LLM_KIND`.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - any error from the provider-specific constructor
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let provider = match env_opt("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::Gemini,
    };

    let cfg = match provider {
        LlmProvider::Ollama => config_ollama()?,
        LlmProvider::OpenAI => config_openai()?,
        LlmProvider::Gemini => config_gemini()?,
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Constructs a config for a local Ollama model.
///
/// # Env
/// - `OLLAMA_URL` / `OLLAMA_PORT` (required)
/// - `OLLAMA_MODEL` (required)
pub fn config_ollama() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("OLLAMA_MODEL")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(DEFAULT_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(600)),
    })
}

/// Constructs a config for the OpenAI chat completions API.
///
/// # Env
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_MODEL` (default `gpt-4o-mini`)
/// - `OPENAI_URL` (default `https://api.openai.com`)
pub fn config_openai() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: env_opt("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        endpoint: env_opt("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(DEFAULT_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

/// Constructs a config for Google Gemini.
///
/// # Env
/// - `GOOGLE_API_KEY` (required)
/// - `GEMINI_MODEL` (default `gemini-1.5-flash-latest`)
/// - `GEMINI_URL` (default `https://generativelanguage.googleapis.com`)
pub fn config_gemini() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Gemini,
        model: env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        endpoint: env_opt("GEMINI_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
        api_key: Some(must_env("GOOGLE_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(DEFAULT_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

//! Provider clients. Each client validates its config at construction and
//! exposes a single non-streaming `generate` call.

pub mod gemini_service;
pub mod ollama_service;
pub mod open_ai_service;

use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{HttpError, ProviderError, ProviderErrorKind, make_snippet};

/// Converts a non-2xx response into a [`ProviderError`], keeping a body snippet.
pub(crate) async fn status_error(
    provider: LlmProvider,
    url: &str,
    resp: reqwest::Response,
) -> ProviderError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    ProviderError::new(
        provider,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet: make_snippet(&text),
        }),
    )
}

/// Checks that the configured endpoint carries an http(s) scheme.
pub(crate) fn check_endpoint(provider: LlmProvider, endpoint: &str) -> Result<(), ProviderError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty()
        || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(endpoint.to_string()),
        ));
    }
    Ok(())
}

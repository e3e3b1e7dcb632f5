use std::fmt;
use std::str::FromStr;

use crate::error_handler::{AiLlmError, ConfigError};

/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// Adding more providers can be done by extending this enum and the
/// provider dispatch in [`crate::llm_service::LlmService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
    /// OpenAI chat completions API.
    OpenAI,
    /// Google Gemini `generateContent` API.
    Gemini,
}

impl LlmProvider {
    /// Stable lowercase name, the same value accepted by `LLM_KIND`.
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = AiLlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            other => Err(ConfigError::UnsupportedProvider(other.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_case_insensitively() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert_eq!("chatgpt".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!(" GEMINI ".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "claude-local".parse::<LlmProvider>().unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::UnsupportedProvider(ref s)) if s == "claude-local"
        ));
    }
}

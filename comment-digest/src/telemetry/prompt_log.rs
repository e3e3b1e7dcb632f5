//! Prompt telemetry: safe DEBUG logging of the exact oracle prompts.
//!
//! ## What it does
//! - Emits one DEBUG line per oracle call (kind, length) and optionally the
//!   full prompt and raw reply.
//! - **Redacts secrets** (Bearer tokens, API keys) before anything is logged.
//! - Truncates huge prompts to a configurable number of characters.
//! - Never writes to disk.
//!
//! ## Env flags
//! - `DIGEST_LOG_PROMPTS` (bool): log full prompt/reply text (default: false)
//! - `DIGEST_PROMPT_REDACT` (bool): redact secrets (default: true)
//! - `DIGEST_PROMPT_MAX_CHARS` (usize): 0 = no truncation (default: 4000)

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::oracle::PromptKind;

const DEFAULT_MAX_CHARS: usize = 4000;

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bBearer\s+[A-Za-z0-9\-_\.=]{16,}",
        r"\bsk-[A-Za-z0-9\-_]{16,}",
        r"\bAIza[0-9A-Za-z\-_]{20,}",
        r"(?i)\b(api[_-]?key|token)\s*[:=]\s*[A-Za-z0-9\-_\.=]{16,}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Returns `true` if the env var is set to a truthy value ("1", "true", "yes", "on").
pub(crate) fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

pub(crate) fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Prompt logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLogConfig {
    pub enabled: bool,
    pub redact: bool,
    pub max_chars: usize,
}

impl Default for PromptLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            redact: true,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl PromptLogConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            enabled: env_flag("DIGEST_LOG_PROMPTS").unwrap_or(d.enabled),
            redact: env_flag("DIGEST_PROMPT_REDACT").unwrap_or(d.redact),
            max_chars: env_usize("DIGEST_PROMPT_MAX_CHARS").unwrap_or(d.max_chars),
        }
    }

    /// Logs the outgoing prompt.
    pub fn log_prompt(&self, kind: PromptKind, prompt: &str) {
        if !self.enabled {
            debug!(kind = kind.as_str(), chars = prompt.chars().count(), "oracle prompt");
            return;
        }
        let (text, truncated) = self.prepare(prompt);
        debug!(
            kind = kind.as_str(),
            chars = prompt.chars().count(),
            truncated,
            "oracle prompt:\n{text}"
        );
    }

    /// Logs the raw reply before parsing.
    pub fn log_reply(&self, kind: PromptKind, reply: &str) {
        if !self.enabled {
            debug!(kind = kind.as_str(), chars = reply.chars().count(), "oracle reply");
            return;
        }
        let (text, truncated) = self.prepare(reply);
        debug!(
            kind = kind.as_str(),
            chars = reply.chars().count(),
            truncated,
            "oracle reply:\n{text}"
        );
    }

    fn prepare(&self, s: &str) -> (String, bool) {
        let content = if self.redact {
            redact_secrets(s)
        } else {
            s.to_string()
        };
        maybe_truncate(content, self.max_chars)
    }
}

/// Redact obvious secrets (best-effort; keep it conservative).
pub fn redact_secrets(s: &str) -> String {
    let mut out = s.to_string();
    for re in SECRET_PATTERNS.iter() {
        out = re.replace_all(&out, "[REDACTED]").into_owned();
    }
    out
}

/// Truncates to at most `max_chars` characters, appending a marker.
fn maybe_truncate(s: String, max_chars: usize) -> (String, bool) {
    if max_chars == 0 || s.chars().count() <= max_chars {
        return (s, false);
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("\n[... TRUNCATED ...]");
    (out, true)
}

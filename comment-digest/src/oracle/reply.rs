//! Parse-then-validate helpers for raw oracle replies.

use ai_llm_service::error_handler::make_snippet;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::errors::OracleError;
use crate::model::Stage;

/// Strips code fences and surrounding prose, leaving the JSON object text.
///
/// Handles ```` ```json ```` / ```` ``` ```` wrappers anywhere in the reply,
/// an unterminated opening fence, and chatty prefixes/suffixes around the
/// object. Returns the trimmed input unchanged when no object is found.
pub fn cleanup_json_like(raw: &str) -> &str {
    let mut t = raw.trim();

    if let Some(start) = t.find("```") {
        let after = &t[start + 3..];
        let after = after
            .strip_prefix("json")
            .or_else(|| after.strip_prefix("JSON"))
            .unwrap_or(after);
        let end = after.find("```").unwrap_or(after.len());
        t = after[..end].trim();
    }

    match (t.find('{'), t.rfind('}')) {
        (Some(open), Some(close)) if open < close => &t[open..=close],
        _ => t,
    }
}

/// Cleans `raw` and deserializes it into `T`.
///
/// # Errors
/// [`OracleError::InvalidReply`] tagged with `stage` if the cleaned text is
/// not valid JSON of the expected shape.
pub fn parse_reply<T: DeserializeOwned>(stage: Stage, raw: &str) -> Result<T, OracleError> {
    let clean = cleanup_json_like(raw);
    serde_json::from_str(clean)
        .map_err(|e| OracleError::invalid(stage, format!("{e}; reply: {}", make_snippet(raw))))
}

/// A code or index the oracle may emit as a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Int(i64),
    /// Unsigned integer above `i64::MAX`.
    Big(u64),
    Float(f64),
    Text(String),
}

impl Loose {
    /// Integer value, accepting numeric strings like `"3"` and whole floats
    /// like `2.0`. Integers beyond `i64` saturate, so they stay out of range
    /// for any index or code check.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Loose::Int(n) => Some(*n),
            Loose::Big(n) => Some(i64::try_from(*n).unwrap_or(i64::MAX)),
            Loose::Float(f) => whole(*f),
            Loose::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<u64>().ok().map(|_| i64::MAX))
            }
        }
    }

    /// Non-numeric text, if any (used for enum names like `"NEGATIVE"`).
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Loose::Text(s) if self.as_int().is_none() => Some(s.as_str()),
            _ => None,
        }
    }
}

fn whole(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds.
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

impl std::fmt::Display for Loose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Loose::Int(n) => write!(f, "{n}"),
            Loose::Big(n) => write!(f, "{n}"),
            Loose::Float(x) => write!(f, "{x}"),
            Loose::Text(s) => write!(f, "{s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    const BODY: &str = r#"{"a": [1, 2], "b": "x"}"#;

    #[test]
    fn fences_and_prose_are_stripped() {
        let variants = [
            BODY.to_string(),
            format!("```json\n{BODY}\n```"),
            format!("```\n{BODY}\n```"),
            format!("```json\n{BODY}"),
            format!("Here is the result:\n```json\n{BODY}\n```\nHope this helps."),
            format!("Sure! {BODY} Let me know."),
        ];
        for v in &variants {
            assert_eq!(cleanup_json_like(v), BODY, "variant: {v:?}");
        }
    }

    #[test]
    fn fenced_and_bare_replies_parse_identically() {
        let bare: Value = parse_reply(Stage::Classifying, BODY).unwrap();
        let fenced: Value =
            parse_reply(Stage::Classifying, &format!("```json\n{BODY}\n```")).unwrap();
        assert_eq!(bare, fenced);
    }

    #[test]
    fn garbage_is_invalid_reply_with_stage() {
        let err = parse_reply::<Value>(Stage::Summarizing, "I cannot help with that.").unwrap_err();
        match err {
            OracleError::InvalidReply { stage, reason } => {
                assert_eq!(stage, Stage::Summarizing);
                assert!(reason.contains("I cannot help with that."));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn loose_codes() {
        let v: Vec<Loose> = serde_json::from_str(r#"[1, "2", " 3 ", "NEGATIVE"]"#).unwrap();
        assert_eq!(v[0].as_int(), Some(1));
        assert_eq!(v[1].as_int(), Some(2));
        assert_eq!(v[2].as_int(), Some(3));
        assert_eq!(v[3].as_int(), None);
        assert_eq!(v[3].as_name(), Some("NEGATIVE"));
        assert_eq!(v[1].as_name(), None);
    }

    #[test]
    fn oversized_and_float_numbers_still_decode() {
        let v: Vec<Loose> =
            serde_json::from_str(r#"[10000000000000000000, 2.0, 1.5, "10000000000000000000"]"#)
                .unwrap();
        assert_eq!(v[0].as_int(), Some(i64::MAX));
        assert_eq!(v[1].as_int(), Some(2));
        assert_eq!(v[2].as_int(), None);
        assert_eq!(v[3].as_int(), Some(i64::MAX));
        assert_eq!(v[3].as_name(), None);
    }
}

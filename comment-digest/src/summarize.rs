//! Summary stage: bullet digest per sentiment.

use serde::Deserialize;
use tracing::debug;

use crate::errors::OracleError;
use crate::model::{Stage, SummaryDigest};
use crate::oracle::reply::parse_reply;
use crate::oracle::{Oracle, OracleClient};
use crate::prompt;

/// Upper bound on entries per summary list. Exceeding it is a contract violation.
pub const MAX_SUMMARY_ITEMS: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SummaryReply {
    positive_summary: Vec<String>,
    negative_summary: Vec<String>,
}

/// Requests a digest of `positive` and `negative` in one oracle call.
///
/// Both lists empty yields an empty digest without calling the oracle.
pub async fn summarize<O: Oracle>(
    client: &OracleClient<O>,
    positive: &[&str],
    negative: &[&str],
) -> Result<SummaryDigest, OracleError> {
    if positive.is_empty() && negative.is_empty() {
        debug!("summarize: both lists empty, skipping oracle call");
        return Ok(SummaryDigest::default());
    }
    debug!(
        positive = positive.len(),
        negative = negative.len(),
        "summarize: requesting digest"
    );

    let raw = client.call(&prompt::summary_request(positive, negative)?).await?;
    parse_summary(&raw)
}

/// Parses a raw summary reply. Never truncates.
///
/// # Errors
/// [`OracleError::InvalidReply`] if the shape differs from
/// `{positive_summary, negative_summary}` or a list has more than
/// [`MAX_SUMMARY_ITEMS`] entries.
pub fn parse_summary(raw: &str) -> Result<SummaryDigest, OracleError> {
    let reply: SummaryReply = parse_reply(Stage::Summarizing, raw)?;

    for (field, list) in [
        ("positive_summary", &reply.positive_summary),
        ("negative_summary", &reply.negative_summary),
    ] {
        if list.len() > MAX_SUMMARY_ITEMS {
            return Err(OracleError::invalid(
                Stage::Summarizing,
                format!(
                    "{field} has {} entries, at most {MAX_SUMMARY_ITEMS} allowed",
                    list.len()
                ),
            ));
        }
    }

    Ok(SummaryDigest {
        positive_summary: reply.positive_summary,
        negative_summary: reply.negative_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_entries_fail_instead_of_truncating() {
        let raw = r#"{"positive_summary":["1","2","3","4","5","6"],"negative_summary":[]}"#;
        let err = parse_summary(raw).unwrap_err();
        match err {
            OracleError::InvalidReply { stage, reason } => {
                assert_eq!(stage, Stage::Summarizing);
                assert!(reason.contains("positive_summary has 6 entries"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn five_entries_are_accepted_in_order() {
        let raw = r#"```json
{"positive_summary":["a","b","c","d","e"],"negative_summary":["x"]}
```"#;
        let d = parse_summary(raw).unwrap();
        assert_eq!(d.positive_summary, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(d.negative_summary, vec!["x"]);
    }

    #[test]
    fn extra_or_missing_keys_are_rejected() {
        assert!(parse_summary(r#"{"positive_summary":[]}"#).is_err());
        assert!(
            parse_summary(r#"{"positive_summary":[],"negative_summary":[],"neutral_summary":[]}"#)
                .is_err()
        );
    }

    #[test]
    fn empty_lists_are_a_valid_reply() {
        let d = parse_summary(r#"{"positive_summary":[],"negative_summary":[]}"#).unwrap();
        assert_eq!(d, SummaryDigest::default());
    }
}

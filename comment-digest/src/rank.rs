//! Ranking stage: prioritized issues over the important comments.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::OracleError;
use crate::model::{Comment, CommentIndex, RankedIssue, Stage, Warning};
use crate::oracle::reply::{Loose, parse_reply};
use crate::oracle::{Oracle, OracleClient};
use crate::prompt::{self, IndexedText};
use crate::select::IndexSet;

pub const MAX_RANKED_ISSUES: usize = 5;
pub const PRIORITY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

const STAGE: Stage = Stage::Ranking;

#[derive(Debug, Deserialize)]
struct RankingReply {
    ranked_summary: Vec<IssueReply>,
}

#[derive(Debug, Deserialize)]
struct IssueReply {
    priority: Loose,
    summary: String,
    indices: Vec<Loose>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    pub issues: Vec<RankedIssue>,
    pub warnings: Vec<Warning>,
}

/// Ranks the comments in `important`, each sent with its original text.
///
/// An empty important set returns an empty ranking without calling the oracle.
pub async fn rank<O: Oracle>(
    client: &OracleClient<O>,
    comments: &[Comment],
    important: &IndexSet,
) -> Result<Ranking, OracleError> {
    let items: Vec<IndexedText<'_>> = important
        .iter()
        .filter_map(|i| comments.get(i.get()))
        .map(|c| IndexedText {
            index: c.index.get(),
            comment: &c.text,
        })
        .collect();

    if items.is_empty() {
        debug!("rank: no important comments, skipping oracle call");
        return Ok(Ranking::default());
    }
    debug!(important = items.len(), "rank: requesting ranked summary");

    let raw = client.call(&prompt::ranking_request(&items)?).await?;
    parse_ranking(&raw, important)
}

/// Parses a raw ranking reply and validates it against `important`.
///
/// The oracle's order is kept as-is. Indices outside `important` are dropped;
/// an issue left without indices is dropped. Both produce warnings.
///
/// # Errors
/// [`OracleError::InvalidReply`] on a malformed reply, more than
/// [`MAX_RANKED_ISSUES`] items, or a priority outside `1..=5`.
pub fn parse_ranking(raw: &str, important: &IndexSet) -> Result<Ranking, OracleError> {
    let reply: RankingReply = parse_reply(STAGE, raw)?;

    if reply.ranked_summary.len() > MAX_RANKED_ISSUES {
        return Err(OracleError::invalid(
            STAGE,
            format!(
                "ranked_summary has {} items, at most {MAX_RANKED_ISSUES} allowed",
                reply.ranked_summary.len()
            ),
        ));
    }

    let mut warnings = Vec::new();
    let mut issues = Vec::with_capacity(reply.ranked_summary.len());

    for item in reply.ranked_summary {
        let priority = item
            .priority
            .as_int()
            .filter(|p| PRIORITY_RANGE.contains(p))
            .and_then(|p| u8::try_from(p).ok())
            .ok_or_else(|| {
                OracleError::invalid(STAGE, format!("priority {} outside 1..=5", item.priority))
            })?;

        let mut kept = BTreeSet::new();
        for raw_index in &item.indices {
            let idx = raw_index
                .as_int()
                .ok_or_else(|| OracleError::invalid(STAGE, format!("index {raw_index} is not an integer")))?;
            match usize::try_from(idx).ok().map(CommentIndex) {
                Some(ci) if important.contains(&ci) => {
                    kept.insert(ci);
                }
                _ => {
                    warn!(priority, index = idx, "rank: dropping index outside the important set");
                    warnings.push(Warning::UnknownRankedIndex { priority, index: idx });
                }
            }
        }

        if kept.is_empty() {
            warn!(priority, summary = %item.summary, "rank: dropping issue without valid indices");
            warnings.push(Warning::EmptyRankedIssue {
                priority,
                summary: item.summary,
            });
            continue;
        }

        issues.push(RankedIssue {
            priority,
            summary: item.summary,
            indices: kept.into_iter().collect(),
        });
    }

    Ok(Ranking { issues, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ix: &[usize]) -> IndexSet {
        ix.iter().copied().map(CommentIndex).collect()
    }

    #[test]
    fn keeps_oracle_order_without_resorting() {
        let raw = r#"{"ranked_summary":[
            {"priority":3,"summary":"c","indices":[4]},
            {"priority":1,"summary":"a","indices":[1,1]},
            {"priority":1,"summary":"b","indices":[2]}
        ]}"#;
        let r = parse_ranking(raw, &set(&[1, 2, 4])).unwrap();
        let order: Vec<(u8, &str)> = r
            .issues
            .iter()
            .map(|i| (i.priority, i.summary.as_str()))
            .collect();
        assert_eq!(order, vec![(3, "c"), (1, "a"), (1, "b")]);
        assert_eq!(r.issues[1].indices, vec![CommentIndex(1)]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn drops_indices_outside_important_set_and_empty_issues() {
        let raw = r#"{"ranked_summary":[
            {"priority":1,"summary":"real","indices":[3, 0, 99]},
            {"priority":2,"summary":"ghost","indices":[7]},
            {"priority":"2","summary":"nothing","indices":[]}
        ]}"#;
        let r = parse_ranking(raw, &set(&[0, 3])).unwrap();
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].indices, vec![CommentIndex(0), CommentIndex(3)]);
        assert_eq!(
            r.warnings,
            vec![
                Warning::UnknownRankedIndex { priority: 1, index: 99 },
                Warning::UnknownRankedIndex { priority: 2, index: 7 },
                Warning::EmptyRankedIssue { priority: 2, summary: "ghost".into() },
                Warning::EmptyRankedIssue { priority: 2, summary: "nothing".into() },
            ]
        );
    }

    #[test]
    fn oversized_index_is_dropped_not_fatal() {
        let raw = r#"{"ranked_summary":[
            {"priority":1,"summary":"kept","indices":[0, 10000000000000000000]}
        ]}"#;
        let r = parse_ranking(raw, &set(&[0])).unwrap();
        assert_eq!(r.issues[0].indices, vec![CommentIndex(0)]);
        assert_eq!(
            r.warnings,
            vec![Warning::UnknownRankedIndex { priority: 1, index: i64::MAX }]
        );
    }

    #[test]
    fn priority_out_of_range_is_invalid() {
        for p in ["0", "6", "-1", "\"high\""] {
            let raw = format!(r#"{{"ranked_summary":[{{"priority":{p},"summary":"s","indices":[0]}}]}}"#);
            assert!(
                matches!(
                    parse_ranking(&raw, &set(&[0])),
                    Err(OracleError::InvalidReply { stage: Stage::Ranking, .. })
                ),
                "priority {p}"
            );
        }
    }

    #[test]
    fn more_than_five_items_is_invalid() {
        let item = r#"{"priority":1,"summary":"s","indices":[0]}"#;
        let raw = format!(r#"{{"ranked_summary":[{}]}}"#, vec![item; 6].join(","));
        assert!(parse_ranking(&raw, &set(&[0])).is_err());
    }
}

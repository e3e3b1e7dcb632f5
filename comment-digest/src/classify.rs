//! Classification stage: one oracle call over the whole comment batch.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::OracleError;
use crate::model::{ClassificationRecord, Comment, CommentIndex, Sentiment, Stage, Topic, Warning};
use crate::oracle::reply::{Loose, parse_reply};
use crate::oracle::{Oracle, OracleClient};
use crate::prompt::{self, IndexedText};

const STAGE: Stage = Stage::Classifying;

#[derive(Debug, Deserialize)]
struct ClassificationReply {
    classifications: Vec<RecordReply>,
    important_comments: Vec<Loose>,
    dangerous_comments: Vec<Loose>,
}

#[derive(Debug, Deserialize)]
struct RecordReply {
    comment_index: Loose,
    sentiment: Loose,
    topic: Loose,
}

/// Validated classification reply.
///
/// `important_comments` / `dangerous_comments` are still raw oracle indices;
/// [`crate::select`] turns them into validated sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// One record per classified comment, unique, ascending by index.
    pub records: Vec<ClassificationRecord>,
    pub important_comments: Vec<i64>,
    pub dangerous_comments: Vec<i64>,
    pub warnings: Vec<Warning>,
}

/// Classifies `comments` with a single oracle call.
///
/// An empty batch returns an empty [`Classification`] without calling the oracle.
///
/// # Errors
/// Any [`OracleError`]; no partial result is returned.
pub async fn classify<O: Oracle>(
    client: &OracleClient<O>,
    comments: &[Comment],
) -> Result<Classification, OracleError> {
    if comments.is_empty() {
        debug!("classify: no comments, skipping oracle call");
        return Ok(Classification::default());
    }

    let items: Vec<IndexedText<'_>> = comments
        .iter()
        .map(|c| IndexedText {
            index: c.index.get(),
            comment: &c.text,
        })
        .collect();

    let raw = client.call(&prompt::classification_request(&items)?).await?;
    parse_classification(&raw, comments.len())
}

/// Parses and validates a raw classification reply for `comment_count` comments.
///
/// # Errors
/// [`OracleError::InvalidReply`] if the reply is not the expected object, an
/// index is not an integer, or a kept record has an unknown sentiment/topic
/// code. Out-of-range and duplicate records are dropped before their codes
/// are looked at.
pub fn parse_classification(
    raw: &str,
    comment_count: usize,
) -> Result<Classification, OracleError> {
    let reply: ClassificationReply = parse_reply(STAGE, raw)?;

    let mut warnings = Vec::new();
    let mut seen = BTreeSet::new();
    let mut records = Vec::with_capacity(reply.classifications.len());

    for rec in reply.classifications {
        let raw_index = int_field("comment_index", &rec.comment_index)?;
        let Some(index) = CommentIndex::checked(raw_index, comment_count) else {
            warn!(index = raw_index, comment_count, "classify: dropping out-of-range record");
            warnings.push(Warning::IndexOutOfRange {
                stage: STAGE,
                field: "classifications".into(),
                index: raw_index,
            });
            continue;
        };
        if !seen.insert(index) {
            warn!(%index, "classify: dropping duplicate record");
            warnings.push(Warning::DuplicateClassification { index });
            continue;
        }
        // Codes are only checked on records that survive index validation.
        records.push(ClassificationRecord {
            comment_index: index,
            sentiment: decode_sentiment(&rec.sentiment)?,
            topic: decode_topic(&rec.topic)?,
        });
    }
    records.sort_by_key(|r| r.comment_index);

    for i in (0..comment_count).map(CommentIndex) {
        if !seen.contains(&i) {
            warn!(index = %i, "classify: comment left unclassified");
            warnings.push(Warning::Unclassified { index: i });
        }
    }

    Ok(Classification {
        records,
        important_comments: int_list("important_comments", &reply.important_comments)?,
        dangerous_comments: int_list("dangerous_comments", &reply.dangerous_comments)?,
        warnings,
    })
}

fn int_field(field: &str, v: &Loose) -> Result<i64, OracleError> {
    v.as_int()
        .ok_or_else(|| OracleError::invalid(STAGE, format!("{field}: {v} is not an integer")))
}

fn int_list(field: &str, values: &[Loose]) -> Result<Vec<i64>, OracleError> {
    values.iter().map(|v| int_field(field, v)).collect()
}

fn decode_sentiment(v: &Loose) -> Result<Sentiment, OracleError> {
    let decoded = match v.as_name() {
        Some(name) => Sentiment::from_name(name),
        None => v
            .as_int()
            .and_then(|n| u64::try_from(n).ok())
            .and_then(Sentiment::from_code),
    };
    decoded.ok_or_else(|| OracleError::invalid(STAGE, format!("unknown sentiment code {v}")))
}

fn decode_topic(v: &Loose) -> Result<Topic, OracleError> {
    let decoded = match v.as_name() {
        Some(name) => Topic::from_name(name),
        None => v
            .as_int()
            .and_then(|n| u64::try_from(n).ok())
            .and_then(Topic::from_code),
    };
    decoded.ok_or_else(|| OracleError::invalid(STAGE, format!("unknown topic code {v}")))
}

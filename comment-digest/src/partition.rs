//! Positive/negative split fed to the summarizer.

use std::fmt;
use std::str::FromStr;

use crate::model::{ClassificationRecord, Comment, Sentiment};

pub const POSITIVE_KEYWORDS: [&str; 4] = ["楽しかった", "分かりやすい", "面白い", "満足"];
pub const NEGATIVE_KEYWORDS: [&str; 4] = ["難しい", "不満", "分からない", "残念"];

/// How comments are split into positive and negative lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Oracle sentiment labels (neutral and unclassified comments are left out).
    #[default]
    Classification,
    /// Substring keyword heuristic; a comment may land in both lists.
    Keywords,
}

impl PartitionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            PartitionStrategy::Classification => "classification",
            PartitionStrategy::Keywords => "keywords",
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" | "oracle" => Ok(PartitionStrategy::Classification),
            "keywords" | "keyword" => Ok(PartitionStrategy::Keywords),
            other => Err(format!("unknown partition strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition<'a> {
    pub positive: Vec<&'a str>,
    pub negative: Vec<&'a str>,
}

/// Splits `comments` according to `strategy`, preserving comment order.
pub fn split<'a>(
    strategy: PartitionStrategy,
    comments: &'a [Comment],
    records: &[ClassificationRecord],
) -> Partition<'a> {
    match strategy {
        PartitionStrategy::Classification => by_classification(comments, records),
        PartitionStrategy::Keywords => by_keywords(comments),
    }
}

pub fn by_classification<'a>(
    comments: &'a [Comment],
    records: &[ClassificationRecord],
) -> Partition<'a> {
    let mut out = Partition::default();
    for rec in records {
        let Some(comment) = comments.get(rec.comment_index.get()) else {
            continue;
        };
        match rec.sentiment {
            Sentiment::Positive => out.positive.push(comment.text.as_str()),
            Sentiment::Negative => out.negative.push(comment.text.as_str()),
            Sentiment::Neutral => {}
        }
    }
    out
}

pub fn by_keywords(comments: &[Comment]) -> Partition<'_> {
    let hits = |text: &str, keys: &[&str]| keys.iter().any(|k| text.contains(k));
    Partition {
        positive: comments
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| hits(t, &POSITIVE_KEYWORDS))
            .collect(),
        negative: comments
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| hits(t, &NEGATIVE_KEYWORDS))
            .collect(),
    }
}

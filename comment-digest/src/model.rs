//! Domain types shared by every pipeline stage.
//!
//! The index types are the backbone of the report: [`CommentIndex`] is the
//! post-filter position every oracle reply refers to, [`RowIndex`] is the raw
//! row in the uploaded table. They never convert into each other implicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Post-filter, contiguous, 0-based comment index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentIndex(pub usize);

/// Raw row position in the input table (before empty cells are dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(pub usize);

impl CommentIndex {
    /// `Some(index)` when `raw` addresses one of `len` comments.
    pub fn checked(raw: i64, len: usize) -> Option<Self> {
        usize::try_from(raw).ok().filter(|i| *i < len).map(CommentIndex)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for CommentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// A non-empty comment extracted from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub index: CommentIndex,
    pub row: RowIndex,
    pub text: String,
}

/// Sentiment label.
///
/// The prompt asks for numeric codes (`0` positive, `1` negative, `2` neutral).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Sentiment::Positive),
            1 => Some(Sentiment::Negative),
            2 => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Some(Sentiment::Positive),
            "NEGATIVE" => Some(Sentiment::Negative),
            "NEUTRAL" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

/// Topic label.
///
/// Codes: `0` lecture content, `1` materials, `2` operations, `3` instructor,
/// `4` chatbot, `5` other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Topic {
    LectureContent,
    Materials,
    Operations,
    Instructor,
    Chatbot,
    Other,
}

impl Topic {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Topic::LectureContent),
            1 => Some(Topic::Materials),
            2 => Some(Topic::Operations),
            3 => Some(Topic::Instructor),
            4 => Some(Topic::Chatbot),
            5 => Some(Topic::Other),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "LECTURE_CONTENT" => Some(Topic::LectureContent),
            "MATERIALS" => Some(Topic::Materials),
            "OPERATIONS" => Some(Topic::Operations),
            "INSTRUCTOR" => Some(Topic::Instructor),
            "CHATBOT" => Some(Topic::Chatbot),
            "OTHER" => Some(Topic::Other),
            _ => None,
        }
    }
}

/// One validated classification per comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub comment_index: CommentIndex,
    pub sentiment: Sentiment,
    pub topic: Topic,
}

/// Bullet-point digest per sentiment; each list holds at most
/// [`crate::summarize::MAX_SUMMARY_ITEMS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDigest {
    pub positive_summary: Vec<String>,
    pub negative_summary: Vec<String>,
}

/// A prioritized group of important comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedIssue {
    /// 1 (most urgent) ..= 5.
    pub priority: u8,
    pub summary: String,
    /// Non-empty, ascending, all members of the important set.
    pub indices: Vec<CommentIndex>,
}

/// Pipeline stages, used to attribute errors and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Classifying,
    Selecting,
    Summarizing,
    Ranking,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Extracting => "extracting",
            Stage::Classifying => "classifying",
            Stage::Selecting => "selecting",
            Stage::Summarizing => "summarizing",
            Stage::Ranking => "ranking",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal conditions surfaced alongside the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The oracle referenced an index outside `[0, comment_count)`.
    IndexOutOfRange {
        stage: Stage,
        field: String,
        index: i64,
    },
    /// The oracle classified the same comment more than once; the first record wins.
    DuplicateClassification { index: CommentIndex },
    /// The oracle returned no classification for this comment.
    Unclassified { index: CommentIndex },
    /// A ranked issue cited an index that is not in the important set.
    UnknownRankedIndex { priority: u8, index: i64 },
    /// A ranked issue had no valid supporting index left and was dropped.
    EmptyRankedIssue { priority: u8, summary: String },
    /// An informational stage failed; its result is absent from the report.
    StageFailed { stage: Stage, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_index_respects_bounds() {
        assert_eq!(CommentIndex::checked(0, 2), Some(CommentIndex(0)));
        assert_eq!(CommentIndex::checked(1, 2), Some(CommentIndex(1)));
        assert_eq!(CommentIndex::checked(2, 2), None);
        assert_eq!(CommentIndex::checked(-1, 2), None);
        assert_eq!(CommentIndex::checked(99, 2), None);
    }

    #[test]
    fn codes_and_names_agree() {
        assert_eq!(Sentiment::from_code(1), Sentiment::from_name("negative"));
        assert_eq!(Topic::from_code(4), Topic::from_name("CHATBOT"));
        assert_eq!(Topic::from_code(6), None);
        assert_eq!(Sentiment::from_name("mixed"), None);
    }

    #[test]
    fn labels_serialize_screaming_snake() {
        let rec = ClassificationRecord {
            comment_index: CommentIndex(3),
            sentiment: Sentiment::Neutral,
            topic: Topic::LectureContent,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "comment_index": 3,
                "sentiment": "NEUTRAL",
                "topic": "LECTURE_CONTENT"
            })
        );
    }
}

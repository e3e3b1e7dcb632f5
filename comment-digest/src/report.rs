//! Aggregated pipeline output.

use serde::{Deserialize, Serialize};

use crate::errors::OracleError;
use crate::model::{ClassificationRecord, Comment, RankedIssue, Warning};
use crate::select::IndexSet;

/// Outcome of an informational stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Failed { error: String, message: String },
}

impl StageStatus {
    pub fn failed(err: &OracleError) -> Self {
        StageStatus::Failed {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StageStatus::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub summarizing: StageStatus,
    pub ranking: StageStatus,
}

/// Report for one analysis run.
///
/// Every index is a post-filter [`crate::model::CommentIndex`] into `comments`.
/// `positive_summary`, `negative_summary` and `ranked_summary` are `None`
/// when their stage failed (see `stages`), and empty on an empty success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub comment_count: usize,
    pub comments: Vec<Comment>,
    pub classifications: Vec<ClassificationRecord>,
    pub important_comments: IndexSet,
    pub dangerous_comments: IndexSet,
    pub positive_summary: Option<Vec<String>>,
    pub negative_summary: Option<Vec<String>>,
    pub ranked_summary: Option<Vec<RankedIssue>>,
    pub stages: StageReport,
    pub warnings: Vec<Warning>,
}

impl AnalysisReport {
    /// `true` if both informational stages succeeded.
    pub fn is_complete(&self) -> bool {
        self.stages.summarizing.is_ok() && self.stages.ranking.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{CommentIndex, Stage};

    #[test]
    fn failed_stage_serializes_kind_and_message() {
        let s = StageStatus::failed(&OracleError::Transport {
            stage: Stage::Ranking,
            message: "connection reset".into(),
        });
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "status": "failed",
                "error": "transport",
                "message": "ranking: oracle transport error: connection reset"
            })
        );
        assert_eq!(serde_json::to_value(StageStatus::Ok).unwrap(), json!({"status": "ok"}));
    }

    #[test]
    fn index_sets_serialize_as_ascending_arrays() {
        let report = AnalysisReport {
            comment_count: 3,
            comments: vec![],
            classifications: vec![],
            important_comments: [CommentIndex(2), CommentIndex(0)].into_iter().collect(),
            dangerous_comments: IndexSet::new(),
            positive_summary: None,
            negative_summary: Some(vec![]),
            ranked_summary: Some(vec![]),
            stages: StageReport {
                summarizing: StageStatus::Ok,
                ranking: StageStatus::Ok,
            },
            warnings: vec![],
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["important_comments"], json!([0, 2]));
        assert_eq!(v["dangerous_comments"], json!([]));
        assert_eq!(v["positive_summary"], json!(null));
        assert_eq!(v["ranked_summary"], json!([]));
    }
}

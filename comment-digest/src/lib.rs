//! Survey comment classification and summarization pipeline.
//!
//! A table of free-text comments goes through:
//! - [`extract`]: validate the table, drop empty cells, assign post-filter indices;
//! - [`classify`]: one oracle call for sentiment/topic plus important/dangerous flags;
//! - [`select`]: validate the flagged indices into ordered sets;
//! - [`summarize`] and [`rank`]: independent informational stages;
//! - [`pipeline`]: state machine and failure policy, producing an [`AnalysisReport`].
//!
//! The oracle is untrusted: every reply is parsed, then validated, before
//! anything from it reaches the report.

pub mod classify;
pub mod errors;
pub mod extract;
pub mod model;
pub mod oracle;
pub mod partition;
pub mod pipeline;
pub mod prompt;
pub mod rank;
pub mod report;
pub mod select;
pub mod summarize;
pub mod telemetry;

pub use errors::{DigestResult, Error, OracleError, SchemaError};
pub use extract::{COMMENT_COLUMN, CommentTable, extract_comments};
pub use model::{
    ClassificationRecord, Comment, CommentIndex, RankedIssue, RowIndex, Sentiment, Stage,
    SummaryDigest, Topic, Warning,
};
pub use oracle::{LlmOracle, Oracle, OracleClient, OracleRequest, PromptKind};
pub use partition::PartitionStrategy;
pub use pipeline::{Pipeline, PipelineConfig, PipelineState};
pub use report::{AnalysisReport, StageReport, StageStatus};

/// Crate target prefix used for log filtering.
pub const TARGET_PREFIX: &str = "comment_digest";

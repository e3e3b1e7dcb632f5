//! Pipeline orchestrator.
//!
//! ```text
//! EXTRACTING -> CLASSIFYING -> SELECTING -> SUMMARIZING -> RANKING -> DONE
//!      \______________\_____________\______________\__________\-> FAILED
//! ```
//!
//! Extraction and classification failures abort the run. Summarizing and
//! ranking are independent; each failure is recorded in the report's stage
//! statuses and the other result is kept.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::classify;
use crate::errors::{DigestResult, Error, OracleError};
use crate::extract::{CommentTable, extract_comments};
use crate::model::{Stage, Warning};
use crate::oracle::{Oracle, OracleClient};
use crate::partition::{self, PartitionStrategy};
use crate::rank::{self, Ranking};
use crate::report::{AnalysisReport, StageReport, StageStatus};
use crate::select;
use crate::summarize;
use crate::telemetry::PromptLogConfig;
use crate::telemetry::prompt_log::env_flag;

pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Extracting,
    Classifying,
    Selecting,
    Summarizing,
    Ranking,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Extracting => "EXTRACTING",
            PipelineState::Classifying => "CLASSIFYING",
            PipelineState::Selecting => "SELECTING",
            PipelineState::Summarizing => "SUMMARIZING",
            PipelineState::Ranking => "RANKING",
            PipelineState::Done => "DONE",
            PipelineState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Logs transitions; DONE and FAILED are terminal.
#[derive(Debug)]
struct StateTracker {
    state: PipelineState,
}

impl StateTracker {
    fn start() -> Self {
        debug!(state = %PipelineState::Extracting, "pipeline: start");
        Self {
            state: PipelineState::Extracting,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "pipeline: transition");
        self.state = next;
    }

    fn fail(&mut self, err: &Error) {
        warn!(from = %self.state, error = %err, "pipeline: failed");
        self.state = PipelineState::Failed;
    }
}

/// Pipeline settings, passed explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Deadline for every single oracle call.
    pub call_timeout: Duration,
    pub partition: PartitionStrategy,
    /// Run summarizing and ranking concurrently.
    pub concurrent_stages: bool,
    pub prompt_log: PromptLogConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            partition: PartitionStrategy::default(),
            concurrent_stages: true,
            prompt_log: PromptLogConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads `DIGEST_*` variables; invalid values fall back to defaults with a warning.
    pub fn from_env() -> Self {
        let d = Self::default();

        let call_timeout = match std::env::var("DIGEST_CALL_TIMEOUT_SECS") {
            Err(_) => d.call_timeout,
            Ok(v) => match v.trim().parse::<u64>().ok().filter(|s| *s > 0) {
                Some(secs) => Duration::from_secs(secs),
                None => {
                    warn!(value = %v, "DIGEST_CALL_TIMEOUT_SECS is not a positive integer, using default");
                    d.call_timeout
                }
            },
        };

        let partition = match std::env::var("DIGEST_PARTITION") {
            Err(_) => d.partition,
            Ok(v) => v.parse::<PartitionStrategy>().unwrap_or_else(|e| {
                warn!(error = %e, "DIGEST_PARTITION invalid, using default");
                d.partition
            }),
        };

        Self {
            call_timeout,
            partition,
            concurrent_stages: env_flag("DIGEST_CONCURRENT_STAGES").unwrap_or(d.concurrent_stages),
            prompt_log: PromptLogConfig::from_env(),
        }
    }
}

/// The comment digest pipeline over one [`Oracle`].
#[derive(Debug, Clone)]
pub struct Pipeline<O> {
    client: OracleClient<O>,
    config: PipelineConfig,
}

impl<O: Oracle> Pipeline<O> {
    pub fn new(oracle: O, config: PipelineConfig) -> Self {
        Self {
            client: OracleClient::new(oracle, config.call_timeout, config.prompt_log.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        self.client.oracle()
    }

    /// Runs one analysis over `table`.
    ///
    /// # Errors
    /// - [`Error::Schema`] before any oracle call if the table is malformed.
    /// - [`Error::Oracle`] if classification fails.
    ///
    /// Summarizing and ranking failures never surface here.
    pub async fn run(&self, table: &CommentTable) -> DigestResult<AnalysisReport> {
        let mut tracker = StateTracker::start();

        let comments = match extract_comments(table) {
            Ok(c) => c,
            Err(e) => {
                let err = Error::from(e);
                tracker.fail(&err);
                return Err(err);
            }
        };
        debug!(rows = table.row_count(), comments = comments.len(), "pipeline: extracted");

        tracker.advance(PipelineState::Classifying);
        let classification = match classify::classify(&self.client, &comments).await {
            Ok(c) => c,
            Err(e) => {
                let err = Error::from(e);
                tracker.fail(&err);
                return Err(err);
            }
        };

        tracker.advance(PipelineState::Selecting);
        let selection = select::select(
            &classification.important_comments,
            &classification.dangerous_comments,
            comments.len(),
        );

        let split = partition::split(self.config.partition, &comments, &classification.records);
        let summary_fut = summarize::summarize(&self.client, &split.positive, &split.negative);
        let rank_fut = rank::rank(&self.client, &comments, &selection.important);

        tracker.advance(PipelineState::Summarizing);
        let (summary, ranking) = if self.config.concurrent_stages {
            tokio::join!(summary_fut, rank_fut)
        } else {
            let summary = summary_fut.await;
            tracker.advance(PipelineState::Ranking);
            (summary, rank_fut.await)
        };
        if self.config.concurrent_stages {
            tracker.advance(PipelineState::Ranking);
        }

        let mut warnings = classification.warnings;
        warnings.extend(selection.warnings);

        let (positive_summary, negative_summary, summarizing) = match summary {
            Ok(d) => (
                Some(d.positive_summary),
                Some(d.negative_summary),
                StageStatus::Ok,
            ),
            Err(e) => (None, None, degrade(&e, &mut warnings)),
        };

        let (ranked_summary, ranking_status) = match ranking {
            Ok(Ranking {
                issues,
                warnings: rank_warnings,
            }) => {
                warnings.extend(rank_warnings);
                (Some(issues), StageStatus::Ok)
            }
            Err(e) => (None, degrade(&e, &mut warnings)),
        };

        tracker.advance(PipelineState::Done);

        let report = AnalysisReport {
            comment_count: comments.len(),
            comments,
            classifications: classification.records,
            important_comments: selection.important,
            dangerous_comments: selection.dangerous,
            positive_summary,
            negative_summary,
            ranked_summary,
            stages: StageReport {
                summarizing,
                ranking: ranking_status,
            },
            warnings,
        };

        info!(
            comments = report.comment_count,
            classified = report.classifications.len(),
            important = report.important_comments.len(),
            dangerous = report.dangerous_comments.len(),
            ranked = report.ranked_summary.as_ref().map_or(0, Vec::len),
            warnings = report.warnings.len(),
            complete = report.is_complete(),
            "pipeline: done"
        );
        Ok(report)
    }
}

fn degrade(err: &OracleError, warnings: &mut Vec<Warning>) -> StageStatus {
    let stage: Stage = err.stage();
    warn!(stage = %stage, error = %err, "pipeline: stage degraded");
    warnings.push(Warning::StageFailed {
        stage,
        error: err.to_string(),
    });
    StageStatus::failed(err)
}

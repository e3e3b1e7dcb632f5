//! Oracle boundary.
//!
//! The oracle is an untrusted, non-deterministic text generator. Everything
//! the pipeline needs from it goes through [`OracleClient`], which enforces a
//! per-call deadline, logs prompts, and parses replies strictly.

pub mod llm;
pub mod reply;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::OracleError;
use crate::model::Stage;
use crate::telemetry::PromptLogConfig;

pub use llm::LlmOracle;

/// Which fixed template a request was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Classification,
    Summary,
    Ranking,
}

impl PromptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptKind::Classification => "classification",
            PromptKind::Summary => "summary",
            PromptKind::Ranking => "ranking",
        }
    }

    pub fn stage(self) -> Stage {
        match self {
            PromptKind::Classification => Stage::Classifying,
            PromptKind::Summary => Stage::Summarizing,
            PromptKind::Ranking => Stage::Ranking,
        }
    }
}

/// One oracle call: prompt kind, optional system instruction, full prompt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub kind: PromptKind,
    pub system: Option<&'static str>,
    pub prompt: String,
}

/// External text-understanding service.
///
/// Implementations return the raw reply text; they do not parse it. Errors
/// should be [`OracleError::Transport`] or [`OracleError::Timeout`] tagged
/// with `request.kind.stage()`.
pub trait Oracle: Send + Sync {
    fn generate(
        &self,
        request: &OracleRequest,
    ) -> impl Future<Output = Result<String, OracleError>> + Send;
}

/// Deadline + telemetry + parsing wrapper around an [`Oracle`].
#[derive(Debug, Clone)]
pub struct OracleClient<O> {
    oracle: O,
    call_timeout: Duration,
    prompt_log: PromptLogConfig,
}

impl<O: Oracle> OracleClient<O> {
    pub fn new(oracle: O, call_timeout: Duration, prompt_log: PromptLogConfig) -> Self {
        Self {
            oracle,
            call_timeout,
            prompt_log,
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Sends `request` once. No retry.
    ///
    /// # Errors
    /// [`OracleError::Timeout`] if no reply arrives within the call timeout,
    /// otherwise whatever the oracle reports.
    pub async fn call(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let stage = request.kind.stage();
        self.prompt_log.log_prompt(request.kind, &request.prompt);

        let started = std::time::Instant::now();
        let reply = match tokio::time::timeout(self.call_timeout, self.oracle.generate(request)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(stage = %stage, error = %e, "oracle call failed");
                return Err(e);
            }
            Err(_) => {
                warn!(stage = %stage, after = ?self.call_timeout, "oracle call timed out");
                return Err(OracleError::Timeout {
                    stage,
                    after: self.call_timeout,
                });
            }
        };

        debug!(
            stage = %stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "oracle replied"
        );
        self.prompt_log.log_reply(request.kind, &reply);
        Ok(reply)
    }

    /// Sends `request` and parses the reply as `T` after stripping fences.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        request: &OracleRequest,
    ) -> Result<T, OracleError> {
        let raw = self.call(request).await?;
        reply::parse_reply(request.kind.stage(), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    impl Oracle for Slow {
        async fn generate(&self, _request: &OracleRequest) -> Result<String, OracleError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("{}".into())
        }
    }

    struct Fenced;

    impl Oracle for Fenced {
        async fn generate(&self, _request: &OracleRequest) -> Result<String, OracleError> {
            Ok("```json\n{\"ok\": true}\n```".into())
        }
    }

    fn request() -> OracleRequest {
        OracleRequest {
            kind: PromptKind::Ranking,
            system: None,
            prompt: "p".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_becomes_timeout_error() {
        let client = OracleClient::new(Slow, Duration::from_secs(5), PromptLogConfig::default());
        let err = client.call(&request()).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::Timeout {
                stage: Stage::Ranking,
                after: Duration::from_secs(5)
            }
        );
    }

    #[tokio::test]
    async fn call_json_strips_fences() {
        #[derive(serde::Deserialize)]
        struct Flag {
            ok: bool,
        }
        let client = OracleClient::new(Fenced, Duration::from_secs(5), PromptLogConfig::default());
        let v: Flag = client.call_json(&request()).await.unwrap();
        assert!(v.ok);
    }
}

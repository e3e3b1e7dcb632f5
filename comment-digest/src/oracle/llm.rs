use std::sync::Arc;

use ai_llm_service::{AiLlmError, LlmService};

use crate::errors::OracleError;
use crate::model::Stage;
use crate::oracle::{Oracle, OracleRequest};

/// [`Oracle`] backed by the shared [`LlmService`].
#[derive(Debug, Clone)]
pub struct LlmOracle {
    svc: Arc<LlmService>,
}

impl LlmOracle {
    pub fn new(svc: Arc<LlmService>) -> Self {
        Self { svc }
    }

    pub fn service(&self) -> &Arc<LlmService> {
        &self.svc
    }

    fn map_error(stage: Stage, err: AiLlmError) -> OracleError {
        match err {
            AiLlmError::Timeout(after) => OracleError::Timeout { stage, after },
            e => OracleError::Transport {
                stage,
                message: e.to_string(),
            },
        }
    }
}

impl Oracle for LlmOracle {
    async fn generate(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.svc
            .generate(&request.prompt, request.system)
            .await
            .map_err(|e| Self::map_error(request.kind.stage(), e))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn service_timeout_becomes_stage_timeout() {
        let err = LlmOracle::map_error(Stage::Ranking, AiLlmError::Timeout(Duration::from_secs(3)));
        assert!(matches!(
            err,
            OracleError::Timeout { stage: Stage::Ranking, after } if after == Duration::from_secs(3)
        ));
    }
}

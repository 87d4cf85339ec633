use std::time::Duration;

use curable_llm::RunStatus;
use curable_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Assistant service error: {0}")]
    Upstream(#[from] anyhow::Error),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistError),

    #[error("Run {run_id} did not finish after {attempts} polls ({waited:?})")]
    UpstreamTimeout {
        run_id: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("Run {run_id} ended with status {status}: {}", reason.as_deref().unwrap_or("no details"))]
    RunFailed {
        run_id: String,
        status: RunStatus,
        reason: Option<String>,
    },
}

impl ConversationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::UpstreamTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConversationError>;

use std::time::{Duration, Instant};

use anyhow::Context;
use curable_llm::{AssistantClient, Run, RunStatus};

use crate::error::{ConversationError, Result};

/// Bounds on waiting for a run to finish
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub run_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 120,
            run_timeout: Duration::from_secs(120),
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }
}

/// Classify a status seen while waiting: `Some(Ok)` when the run completed,
/// `Some(Err)` when it ended any other way, `None` while it is still going.
pub(crate) fn settle(run: &Run) -> Option<Result<()>> {
    match run.status {
        RunStatus::Completed => Some(Ok(())),
        status if status.is_terminal() => Some(Err(ConversationError::RunFailed {
            run_id: run.id.clone(),
            status,
            reason: run
                .last_error
                .as_ref()
                .map(|e| format!("{}: {}", e.code, e.message)),
        })),
        _ => None,
    }
}

/// Poll `run` until it completes, fails, or the attempt/time budget runs out.
pub async fn wait_for_run(
    assistant: &dyn AssistantClient,
    run: Run,
    config: &PollConfig,
) -> Result<Run> {
    if let Some(outcome) = settle(&run) {
        return outcome.map(|_| run);
    }

    let started = Instant::now();
    let mut attempts = 0;

    while attempts < config.max_poll_attempts {
        let remaining = config.run_timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(config.poll_interval.min(remaining)).await;
        attempts += 1;

        let current = match tokio::time::timeout(
            config.run_timeout.saturating_sub(started.elapsed()),
            assistant.retrieve_run(&run.thread_id, &run.id),
        )
        .await
        {
            Ok(result) => result.context("Failed to retrieve run")?,
            Err(_) => break,
        };

        tracing::debug!(run_id = %current.id, status = %current.status, attempts, "Polled run");
        if let Some(outcome) = settle(&current) {
            if let Err(ref e) = outcome {
                tracing::warn!(run_id = %current.id, error = %e, "Run did not complete");
            }
            return outcome.map(|_| current);
        }
    }

    let waited = started.elapsed();
    tracing::warn!(run_id = %run.id, attempts, waited_ms = waited.as_millis() as u64, "Gave up waiting for run");
    Err(ConversationError::UpstreamTimeout {
        run_id: run.id,
        attempts,
        waited,
    })
}

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;

use curable_context::ContextStrategy;
use curable_llm::{AssistantClient, MessageRole, RunEventStream, StreamEvent};
use curable_persist::{PersistenceClient, ThreadBinding};

use crate::error::{ConversationError, Result};
use crate::polling::{wait_for_run, PollConfig};
use crate::resolver::ThreadResolver;

/// Reply text used when a completed run left no assistant message
pub const NO_RESPONSE: &str = "No response";

/// Newest messages inspected when looking for the reply of a finished run
const REPLY_SCAN_LIMIT: usize = 20;

/// Reply text fragments, in arrival order
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub thread_id: String,
    /// Insight phrases injected into the thread on this turn
    pub insights_used: Vec<String>,
}

/// Runs one conversational turn against the hosted assistant.
#[derive(Clone)]
pub struct ConversationDriver {
    assistant: Arc<dyn AssistantClient>,
    persist: Arc<dyn PersistenceClient>,
    context: Arc<dyn ContextStrategy>,
    resolver: ThreadResolver,
    assistant_id: String,
    poll: PollConfig,
    /// Held while a thread is being seeded, keyed by thread id
    seeding: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ConversationDriver {
    pub fn new(
        assistant: Arc<dyn AssistantClient>,
        persist: Arc<dyn PersistenceClient>,
        context: Arc<dyn ContextStrategy>,
        assistant_id: impl Into<String>,
    ) -> Self {
        Self {
            resolver: ThreadResolver::new(Arc::clone(&assistant), Arc::clone(&persist)),
            assistant,
            persist,
            context,
            assistant_id: assistant_id.into(),
            poll: PollConfig::default(),
            seeding: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn resolver(&self) -> &ThreadResolver {
        &self.resolver
    }

    /// Send `message` and wait for the assistant's full reply
    pub async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply> {
        let (binding, insights_used) = self.prepare_turn(user_id, message).await?;
        let thread_id = binding.thread_id;

        let run = self
            .assistant
            .create_run(&thread_id, &self.assistant_id)
            .await
            .context("Failed to start run")?;
        tracing::debug!(user_id, thread_id = %thread_id, run_id = %run.id, "Run started");

        let run = wait_for_run(self.assistant.as_ref(), run, &self.poll).await?;
        let reply = self.latest_reply(&thread_id).await?;

        tracing::info!(user_id, thread_id = %thread_id, run_id = %run.id, "Chat turn completed");
        Ok(ChatReply {
            reply,
            thread_id,
            insights_used,
        })
    }

    /// Send `message` and stream the reply as it is generated.
    ///
    /// Thread resolution, seeding and run creation happen before this returns,
    /// so their failures surface here rather than inside the stream. Dropping
    /// the stream stops reading from upstream.
    pub async fn chat_stream(&self, user_id: &str, message: &str) -> Result<ReplyStream> {
        let (binding, _) = self.prepare_turn(user_id, message).await?;
        let events = self
            .assistant
            .stream_run(&binding.thread_id, &self.assistant_id)
            .await
            .context("Failed to start streaming run")?;
        tracing::debug!(user_id, thread_id = %binding.thread_id, "Streaming run started");

        let (tx, rx) = mpsc::channel(64);
        let thread_id = binding.thread_id;
        tokio::spawn(async move {
            forward_reply(events, tx, &thread_id).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// Resolve the thread, seed it on the first turn, then append the user's message
    async fn prepare_turn(&self, user_id: &str, message: &str) -> Result<(ThreadBinding, Vec<String>)> {
        let binding = self.resolver.resolve(user_id).await?;
        let insights_used = self.seed_if_first_turn(&binding).await?;

        self.assistant
            .add_message(&binding.thread_id, MessageRole::User, message)
            .await
            .context("Failed to add user message")?;

        Ok((binding, insights_used))
    }

    /// Seed the thread unless another request already claimed it.
    ///
    /// Requests in this process that lose the claim wait until the winner has
    /// finished seeding, so their message lands after the profile context.
    /// Requests served by other instances are only deduplicated by the claim.
    async fn seed_if_first_turn(&self, binding: &ThreadBinding) -> Result<Vec<String>> {
        if binding.context_seeded {
            return Ok(Vec::new());
        }
        let thread_id = binding.thread_id.as_str();

        let lock = {
            let mut seeding = self.seeding.lock().await;
            Arc::clone(seeding.entry(thread_id.to_string()).or_default())
        };
        let _guard = lock.lock().await;

        let outcome = self.claim_and_seed(binding).await;
        self.seeding.lock().await.remove(thread_id);
        outcome
    }

    async fn claim_and_seed(&self, binding: &ThreadBinding) -> Result<Vec<String>> {
        let user_id = binding.user_id.as_str();
        let thread_id = binding.thread_id.as_str();

        if !self.persist.claim_context_seed(user_id, thread_id).await? {
            tracing::debug!(user_id, thread_id, "Context already seeded by another request");
            return Ok(Vec::new());
        }

        match self.seed(binding).await {
            Ok(insights) => Ok(insights),
            Err(e) => {
                if let Err(release) = self.persist.release_context_seed(user_id, thread_id).await {
                    tracing::error!(user_id, thread_id, error = %release, "Failed to release seed claim");
                }
                Err(e)
            }
        }
    }

    async fn seed(&self, binding: &ThreadBinding) -> Result<Vec<String>> {
        let seed = self.context.seed_context(&binding.user_id).await?;

        self.assistant
            .add_message(&binding.thread_id, MessageRole::User, &seed.seed_message())
            .await
            .context("Failed to add profile context")?;

        if let Some(greeting) = &seed.greeting {
            self.assistant
                .add_message(&binding.thread_id, MessageRole::Assistant, greeting)
                .await
                .context("Failed to add greeting")?;
        }

        tracing::info!(
            user_id = %binding.user_id,
            thread_id = %binding.thread_id,
            insights = seed.insights.len(),
            analysis = seed.analysis.is_some(),
            "Seeded thread with profile context"
        );
        Ok(seed.insights)
    }

    /// Text of the newest assistant message in the thread
    async fn latest_reply(&self, thread_id: &str) -> Result<String> {
        let messages = self
            .assistant
            .recent_messages(thread_id, REPLY_SCAN_LIMIT)
            .await
            .context("Failed to list thread messages")?;

        Ok(messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .find_map(|m| m.text())
            .map(str::to_string)
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

async fn forward_reply(
    mut events: RunEventStream,
    tx: mpsc::Sender<Result<String>>,
    thread_id: &str,
) {
    while let Some(event) = events.next().await {
        let item = match event {
            Ok(StreamEvent::Message { content }) => Ok(content),
            Ok(StreamEvent::RunStatus { run_id, status, error }) => {
                if !status.is_terminal() || status == curable_llm::RunStatus::Completed {
                    continue;
                }
                tracing::warn!(thread_id, run_id = %run_id, status = %status, "Streaming run did not complete");
                Err(ConversationError::RunFailed {
                    run_id,
                    status,
                    reason: error,
                })
            }
            Ok(StreamEvent::Done { .. }) => break,
            Err(e) => Err(ConversationError::Upstream(e)),
        };

        let failed = item.is_err();
        if tx.send(item).await.is_err() {
            tracing::debug!(thread_id, "Reply stream dropped by client");
            return;
        }
        if failed {
            return;
        }
    }
}

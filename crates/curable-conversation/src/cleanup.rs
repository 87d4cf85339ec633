use std::sync::Arc;

use anyhow::Context;
use curable_llm::{AssistantClient, ChatClient, ChatRequest, ListOrder, Message, ThreadMessage};
use curable_persist::{ChatSummary, PersistenceClient};

use crate::error::Result;
use crate::resolver::ThreadResolver;

const SUMMARY_SYSTEM_PROMPT: &str = "Summarize conversations for medical record.";
const SUMMARY_PROMPT: &str = "Summarize the following patient conversation in 5 sentences:\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The user never started a conversation; nothing was written
    NoThread,
    Completed {
        summary: String,
        /// The replacement thread now bound to the user
        thread_id: String,
    },
}

/// Summarizes a user's conversation into their record and starts them on a fresh thread.
pub struct CleanupService {
    assistant: Arc<dyn AssistantClient>,
    chat: Arc<dyn ChatClient>,
    persist: Arc<dyn PersistenceClient>,
    resolver: ThreadResolver,
    model: String,
}

impl CleanupService {
    pub fn new(
        assistant: Arc<dyn AssistantClient>,
        chat: Arc<dyn ChatClient>,
        persist: Arc<dyn PersistenceClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            resolver: ThreadResolver::new(Arc::clone(&assistant), Arc::clone(&persist)),
            assistant,
            chat,
            persist,
            model: model.into(),
        }
    }

    pub async fn cleanup(&self, user_id: &str) -> Result<CleanupOutcome> {
        let Some(binding) = self.persist.get_thread_binding(user_id).await? else {
            tracing::info!(user_id, "No thread to clean up");
            return Ok(CleanupOutcome::NoThread);
        };

        let messages = self
            .assistant
            .list_messages(&binding.thread_id, ListOrder::Asc)
            .await
            .context("Failed to list thread messages")?;

        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                Message::system(SUMMARY_SYSTEM_PROMPT),
                Message::human(format!("{}{}", SUMMARY_PROMPT, transcript(&messages))),
            ],
        );
        let response = self
            .chat
            .chat(request)
            .await
            .context("Conversation summary call failed")?;
        let summary = response.text()?.trim().to_string();

        // Nothing is written until the replacement thread exists upstream
        let replacement = self.resolver.create_thread().await?;

        self.persist
            .save_chat_summary(ChatSummary::new(
                user_id,
                binding.thread_id.as_str(),
                summary.as_str(),
                messages.len(),
            ))
            .await?;

        let fresh = self.resolver.bind(user_id, replacement.id).await?;
        tracing::info!(
            user_id,
            old_thread_id = %binding.thread_id,
            thread_id = %fresh.thread_id,
            messages = messages.len(),
            "Conversation summarized and thread replaced"
        );

        Ok(CleanupOutcome::Completed {
            summary,
            thread_id: fresh.thread_id,
        })
    }
}

/// One `role: text` line per message
fn transcript(messages: &[ThreadMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.text().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

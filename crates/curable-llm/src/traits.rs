use crate::assistants::{AssistantThread, ListOrder, MessageRole, Run, ThreadMessage};
use crate::streaming::StreamEvent;
use crate::types::Message;
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Stream of events emitted by a streamed assistant run
pub type RunEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Trait for single-shot chat completions (summaries, analyses, assessments)
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Trait for the hosted assistant service (threads, messages, runs)
///
/// A thread keeps the conversation history on the provider side; a run
/// executes the configured assistant against everything appended so far.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Create an empty conversation thread
    async fn create_thread(&self) -> Result<AssistantThread>;

    /// Append a message to a thread
    async fn add_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage>;

    /// List every message of a thread in the requested order
    async fn list_messages(&self, thread_id: &str, order: ListOrder) -> Result<Vec<ThreadMessage>>;

    /// Newest messages of a thread, newest first, from a single page of at most `limit`
    async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<ThreadMessage>>;

    /// Start a run of `assistant_id` over the thread
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Start a run and stream its events as they happen
    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_format: Option<ResponseFormat>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// Output format requested from the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub raw: serde_json::Value,
}

impl ChatResponse {
    /// Response text, failing when the provider returned no content
    pub fn text(&self) -> Result<&str> {
        self.content
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Completion returned no content"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

// OpenAI client: chat completions + assistants v2 (threads, messages, runs)

use crate::assistants::{AssistantThread, ListOrder, MessageRole, Run, ThreadMessage};
use crate::streaming::parse_run_sse_stream;
use crate::traits::{
    AssistantClient, ChatClient, ChatOptions, ChatRequest, ChatResponse, RunEventStream,
    TokenUsage,
};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Page size used when listing thread messages (API maximum)
const MESSAGE_PAGE_SIZE: u32 = 100;

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );
        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_static("assistants=v2"),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point the client at another base URL (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build chat completion request payload
    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<Value> {
        let openai_messages: Vec<Value> = messages
            .into_iter()
            .map(|msg| self.convert_message(msg))
            .collect();

        let mut request = serde_json::json!({
            "model": model,
            "messages": openai_messages,
        });

        if let Some(obj) = request.as_object_mut() {
            if let Some(temp) = options.temperature {
                obj.insert("temperature".to_string(), serde_json::json!(temp));
            }
            if let Some(max_tokens) = options.max_tokens {
                obj.insert("max_completion_tokens".to_string(), serde_json::json!(max_tokens));
            }
            if let Some(format) = &options.response_format {
                obj.insert("response_format".to_string(), serde_json::to_value(format)?);
            }
        }

        Ok(request)
    }

    /// Convert our Message type to OpenAI format
    fn convert_message(&self, message: Message) -> Value {
        let role = message.role().to_string();
        let (content, name) = match message {
            Message::System { content, name }
            | Message::Human { content, name }
            | Message::AI { content, name } => (content, name),
        };

        let mut obj = serde_json::json!({
            "role": role,
            "content": content.to_text(),
        });
        if let (Some(name), Some(map)) = (name, obj.as_object_mut()) {
            map.insert("name".to_string(), serde_json::json!(name));
        }
        obj
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, payload: &Value) -> Result<T> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        response.json().await.context("Failed to parse response")
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, request.messages, &request.options)?;

        let raw: OpenAIChatResponse = self.post_json("/chat/completions", &payload).await?;

        // Convert to provider-agnostic response
        let choice = raw.choices.first();
        Ok(ChatResponse {
            content: choice.and_then(|c| c.message.content.clone()),
            usage: raw.usage.as_ref().map(|usage| TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            raw: serde_json::to_value(&raw)?,
        })
    }
}

#[async_trait]
impl AssistantClient for OpenAIClient {
    async fn create_thread(&self) -> Result<AssistantThread> {
        let thread: AssistantThread = self.post_json("/threads", &serde_json::json!({})).await?;
        tracing::debug!(thread_id = %thread.id, "Created assistant thread");
        Ok(thread)
    }

    async fn add_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage> {
        let payload = serde_json::json!({
            "role": role.as_str(),
            "content": content,
        });
        self.post_json(&format!("/threads/{}/messages", thread_id), &payload)
            .await
    }

    async fn list_messages(&self, thread_id: &str, order: ListOrder) -> Result<Vec<ThreadMessage>> {
        let path = format!("/threads/{}/messages", thread_id);
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![
                ("order", order.as_str().to_string()),
                ("limit", MESSAGE_PAGE_SIZE.to_string()),
            ];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let page: MessageList = self.get_json(&path, &query).await?;
            messages.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more => after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }

    async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<ThreadMessage>> {
        let query = [
            ("order", ListOrder::Desc.as_str().to_string()),
            ("limit", limit.clamp(1, MESSAGE_PAGE_SIZE as usize).to_string()),
        ];
        let page: MessageList = self
            .get_json(&format!("/threads/{}/messages", thread_id), &query)
            .await?;
        Ok(page.data)
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let payload = serde_json::json!({ "assistant_id": assistant_id });
        let run: Run = self
            .post_json(&format!("/threads/{}/runs", thread_id), &payload)
            .await?;
        tracing::debug!(thread_id, run_id = %run.id, status = %run.status, "Created run");
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get_json(&format!("/threads/{}/runs/{}", thread_id, run_id), &[])
            .await
    }

    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream> {
        let payload = serde_json::json!({
            "assistant_id": assistant_id,
            "stream": true,
        });

        let response = self
            .http_client
            .post(format!("{}/threads/{}/runs", self.base_url, thread_id))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        Ok(parse_run_sse_stream(response))
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    last_id: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ResponseFormat;

    #[test]
    fn test_chat_payload_includes_options() {
        let client = OpenAIClient::new("sk-test").unwrap();
        let options = ChatOptions::new()
            .temperature(0.2)
            .max_tokens(400)
            .response_format(ResponseFormat::JsonObject);

        let payload = client
            .build_chat_request(
                "gpt-4o-mini",
                vec![Message::system("Be brief."), Message::human("Hi")],
                &options,
            )
            .unwrap();

        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "Hi");
        assert_eq!(payload["max_completion_tokens"], 400);
        assert_eq!(payload["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenAIClient::new("sk-test")
            .unwrap()
            .with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }
}

// Assistant service wire types (threads, messages, runs)

use serde::{Deserialize, Serialize};

/// Conversation thread handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantThread {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Message stored on a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub created_at: i64,
}

impl ThreadMessage {
    /// Text of the first text block, if any
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Other => None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

impl MessageContent {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            text: TextValue { value: value.into() },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// Ordering for message listings (by creation time)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Asc,
    Desc,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One assistant invocation against a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Whether the run will never change state again on its own.
    /// `RequiresAction` counts: no tools are registered, so nothing resumes it.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::InProgress | Self::Cancelling)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_terminal() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::RequiresAction.is_terminal());
    }

    #[test]
    fn test_thread_message_text_skips_non_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "thread_id": "thread_1",
            "role": "assistant",
            "created_at": 1700000000,
            "content": [
                {"type": "image_file", "image_file": {"file_id": "f"}},
                {"type": "text", "text": {"value": "Drink water", "annotations": []}}
            ]
        }"#;

        let message: ThreadMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.text(), Some("Drink water"));
    }
}

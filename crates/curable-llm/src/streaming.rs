use anyhow::Result;
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::assistants::{RunError, RunStatus};
use crate::buffer_utils::{parse_sse_stream, SseLineParser};
use crate::traits::RunEventStream;

/// Event emitted while an assistant run is streamed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text fragment of the assistant's reply
    Message {
        content: String,
    },

    /// Run changed state
    RunStatus {
        run_id: String,
        status: RunStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Upstream closed the stream
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

/// Raw `data:` payload of the assistants event stream.
///
/// Every payload is a full object (`thread.run`, `thread.message.delta`, ...),
/// so the `event:` line is not needed to interpret it.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantStreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub status: Option<RunStatus>,
    #[serde(default)]
    pub delta: Option<MessageDelta>,
    #[serde(default)]
    pub last_error: Option<RunError>,
    /// Present on `error` events
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelta {
    #[serde(default)]
    pub content: Vec<DeltaContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaContent {
    #[serde(default)]
    pub text: Option<DeltaText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaText {
    #[serde(default)]
    pub value: Option<String>,
}

impl AssistantStreamChunk {
    /// Concatenated text carried by a message delta
    pub fn delta_text(&self) -> Option<String> {
        let delta = self.delta.as_ref()?;
        let text: String = delta
            .content
            .iter()
            .filter_map(|c| c.text.as_ref().and_then(|t| t.value.as_deref()))
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn to_stream_events(&self) -> Result<Vec<StreamEvent>> {
        match self.object.as_deref() {
            Some("thread.message.delta") => Ok(self
                .delta_text()
                .map(|content| vec![StreamEvent::Message { content }])
                .unwrap_or_default()),
            Some("thread.run") => {
                let Some(status) = self.status else {
                    return Ok(vec![]);
                };
                Ok(vec![StreamEvent::RunStatus {
                    run_id: self.id.clone().unwrap_or_default(),
                    status,
                    error: self.last_error.as_ref().map(|e| format!("{}: {}", e.code, e.message)),
                }])
            }
            Some(_) => Ok(vec![]),
            None => match &self.message {
                Some(message) => Err(anyhow::anyhow!("Assistant stream error: {}", message)),
                None => Ok(vec![]),
            },
        }
    }
}

/// Parser for `POST /threads/{id}/runs` with `stream: true`
pub struct RunStreamParser;

impl SseLineParser for RunStreamParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>> {
        let chunk: AssistantStreamChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse assistant chunk: {}", e))?;
        chunk.to_stream_events()
    }
}

pub fn parse_run_sse_stream(response: Response) -> RunEventStream {
    parse_sse_stream(response, RunStreamParser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_delta_becomes_message_event() {
        let data = r#"{"id":"msg_1","object":"thread.message.delta","delta":{"content":[{"index":0,"type":"text","text":{"value":"Hi ","annotations":[]}}]}}"#;
        let events = RunStreamParser.parse_data_line(data).unwrap();
        assert_eq!(events, vec![StreamEvent::Message { content: "Hi ".to_string() }]);
    }

    #[test]
    fn test_failed_run_carries_error() {
        let data = r#"{"id":"run_1","object":"thread.run","status":"failed","last_error":{"code":"server_error","message":"boom"}}"#;
        let events = RunStreamParser.parse_data_line(data).unwrap();
        match &events[0] {
            StreamEvent::RunStatus { run_id, status, error } => {
                assert_eq!(run_id, "run_1");
                assert_eq!(*status, RunStatus::Failed);
                assert_eq!(error.as_deref(), Some("server_error: boom"));
            }
            other => panic!("Expected RunStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_step_objects_are_ignored() {
        let data = r#"{"id":"step_1","object":"thread.run.step","status":"in_progress"}"#;
        assert!(RunStreamParser.parse_data_line(data).unwrap().is_empty());
    }
}

//! Scripted in-process stand-ins for the assistant and completion services.
//!
//! Enabled with the `testing` feature; used by the conversation and API test suites.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;

use crate::assistants::{AssistantThread, ListOrder, MessageContent, MessageRole, Run, RunError, RunStatus, ThreadMessage};
use crate::streaming::StreamEvent;
use crate::traits::{AssistantClient, ChatClient, ChatRequest, ChatResponse, RunEventStream};

struct AssistantState {
    next_id: u64,
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, VecDeque<RunStatus>>,
    reply: String,
    run_script: Vec<RunStatus>,
    threads_created: usize,
    runs_created: usize,
    fail_thread_creation: bool,
    hold_stream_open: bool,
    recent_listings: usize,
}

/// Assistant service fake keeping threads in memory.
///
/// Each run walks through `run_script` on successive `retrieve_run` calls (the last
/// status repeats). When the script reaches `Completed`, the scripted reply is
/// appended to the thread as an assistant message.
pub struct ScriptedAssistant {
    state: Mutex<AssistantState>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AssistantState {
                next_id: 0,
                threads: HashMap::new(),
                runs: HashMap::new(),
                reply: "Scripted reply".to_string(),
                run_script: vec![RunStatus::InProgress, RunStatus::Completed],
                threads_created: 0,
                runs_created: 0,
                fail_thread_creation: false,
                hold_stream_open: false,
                recent_listings: 0,
            }),
        }
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.lock().reply = reply.into();
        self
    }

    pub fn with_run_script(self, script: Vec<RunStatus>) -> Self {
        self.lock().run_script = script;
        self
    }

    pub fn failing_thread_creation(self) -> Self {
        self.lock().fail_thread_creation = true;
        self
    }

    /// Streamed runs emit the reply and then never finish
    pub fn holding_stream_open(self) -> Self {
        self.lock().hold_stream_open = true;
        self
    }

    /// Toggle thread creation failures on an assistant already in use
    pub fn set_thread_creation_failing(&self, fail: bool) {
        self.lock().fail_thread_creation = fail;
    }

    /// Number of `recent_messages` calls served
    pub fn recent_listings(&self) -> usize {
        self.lock().recent_listings
    }

    pub fn threads_created(&self) -> usize {
        self.lock().threads_created
    }

    pub fn runs_created(&self) -> usize {
        self.lock().runs_created
    }

    /// Messages of a thread, oldest first
    pub fn messages(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.lock().threads.get(thread_id).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AssistantState> {
        self.state.lock().expect("scripted assistant state poisoned")
    }

    fn push_message(state: &mut AssistantState, thread_id: &str, role: MessageRole, content: &str) -> Result<ThreadMessage> {
        state.next_id += 1;
        let message = ThreadMessage {
            id: format!("msg_{}", state.next_id),
            thread_id: thread_id.to_string(),
            role,
            content: vec![MessageContent::text(content)],
            created_at: state.next_id as i64,
        };
        state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| anyhow::anyhow!("No thread {}", thread_id))?
            .push(message.clone());
        Ok(message)
    }

    fn current_status(state: &mut AssistantState, run_id: &str) -> Result<RunStatus> {
        let queue = state
            .runs
            .get_mut(run_id)
            .ok_or_else(|| anyhow::anyhow!("No run {}", run_id))?;
        let status = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        };
        status.ok_or_else(|| anyhow::anyhow!("Run {} has an empty script", run_id))
    }
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantClient for ScriptedAssistant {
    async fn create_thread(&self) -> Result<AssistantThread> {
        let mut state = self.lock();
        if state.fail_thread_creation {
            anyhow::bail!("OpenAI API error (500 Internal Server Error): thread creation disabled");
        }
        state.next_id += 1;
        state.threads_created += 1;
        let id = format!("thread_{}", state.next_id);
        state.threads.insert(id.clone(), Vec::new());
        Ok(AssistantThread { id, created_at: state.next_id as i64 })
    }

    async fn add_message(&self, thread_id: &str, role: MessageRole, content: &str) -> Result<ThreadMessage> {
        let mut state = self.lock();
        Self::push_message(&mut state, thread_id, role, content)
    }

    async fn list_messages(&self, thread_id: &str, order: ListOrder) -> Result<Vec<ThreadMessage>> {
        let mut messages = self
            .lock()
            .threads
            .get(thread_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No thread {}", thread_id))?;
        if order == ListOrder::Desc {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<ThreadMessage>> {
        let mut state = self.lock();
        state.recent_listings += 1;
        let messages = state
            .threads
            .get(thread_id)
            .ok_or_else(|| anyhow::anyhow!("No thread {}", thread_id))?;
        Ok(messages.iter().rev().take(limit).cloned().collect())
    }

    async fn create_run(&self, thread_id: &str, _assistant_id: &str) -> Result<Run> {
        let mut state = self.lock();
        if !state.threads.contains_key(thread_id) {
            anyhow::bail!("No thread {}", thread_id);
        }
        state.next_id += 1;
        state.runs_created += 1;
        let run_id = format!("run_{}", state.next_id);

        if state.run_script.contains(&RunStatus::Completed) {
            let reply = state.reply.clone();
            Self::push_message(&mut state, thread_id, MessageRole::Assistant, &reply)?;
        }
        let script: VecDeque<RunStatus> = state.run_script.iter().copied().collect();
        state.runs.insert(run_id.clone(), script);

        Ok(Run {
            id: run_id,
            thread_id: thread_id.to_string(),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let mut state = self.lock();
        let status = Self::current_status(&mut state, run_id)?;
        let last_error = (status == RunStatus::Failed).then(|| RunError {
            code: "server_error".to_string(),
            message: "scripted failure".to_string(),
        });
        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            status,
            last_error,
        })
    }

    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream> {
        let run = self.create_run(thread_id, assistant_id).await?;
        let (reply, final_status, hold_open) = {
            let state = self.lock();
            let final_status = state.run_script.last().copied().unwrap_or(RunStatus::Completed);
            (state.reply.clone(), final_status, state.hold_stream_open)
        };

        if hold_open {
            let deltas: Vec<Result<StreamEvent>> = reply
                .split_inclusive(' ')
                .map(|piece| Ok(StreamEvent::Message { content: piece.to_string() }))
                .collect();
            return Ok(Box::pin(futures::stream::iter(deltas).chain(futures::stream::pending())));
        }

        let mut events: Vec<Result<StreamEvent>> = Vec::new();
        if final_status == RunStatus::Completed {
            events.extend(reply.split_inclusive(' ').map(|piece| {
                Ok(StreamEvent::Message { content: piece.to_string() })
            }));
        }
        events.push(Ok(StreamEvent::RunStatus {
            run_id: run.id,
            status: final_status,
            error: (final_status == RunStatus::Failed).then(|| "server_error: scripted failure".to_string()),
        }));
        events.push(Ok(StreamEvent::Done { finish_reason: None }));

        Ok(Box::pin(futures::stream::iter(events)))
    }
}

/// Completion service fake returning a fixed answer (or a fixed error)
pub struct ScriptedChat {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            reply: Err(error.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("scripted chat state poisoned").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("scripted chat state poisoned").len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .expect("scripted chat state poisoned")
            .push(request);

        match &self.reply {
            Ok(text) => Ok(ChatResponse {
                content: Some(text.clone()),
                usage: None,
                finish_reason: Some("stop".to_string()),
                raw: serde_json::json!({}),
            }),
            Err(error) => Err(anyhow::anyhow!("{}", error)),
        }
    }
}

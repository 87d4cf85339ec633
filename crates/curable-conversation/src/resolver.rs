use std::sync::Arc;

use anyhow::Context;
use curable_llm::{AssistantClient, AssistantThread};
use curable_persist::{PersistenceClient, ThreadBinding};

use crate::error::Result;

/// Maps a user to their assistant thread, creating one on first use.
#[derive(Clone)]
pub struct ThreadResolver {
    assistant: Arc<dyn AssistantClient>,
    persist: Arc<dyn PersistenceClient>,
}

impl ThreadResolver {
    pub fn new(assistant: Arc<dyn AssistantClient>, persist: Arc<dyn PersistenceClient>) -> Self {
        Self { assistant, persist }
    }

    /// Stored binding, or a newly created and persisted one.
    ///
    /// Concurrent first calls may each create a thread; the last save wins and
    /// the other threads are left unreferenced upstream.
    pub async fn resolve(&self, user_id: &str) -> Result<ThreadBinding> {
        if let Some(binding) = self.persist.get_thread_binding(user_id).await? {
            tracing::debug!(user_id, thread_id = %binding.thread_id, "Using stored thread");
            return Ok(binding);
        }
        self.create(user_id).await
    }

    /// Create a fresh thread and overwrite whatever binding the user had
    pub async fn create(&self, user_id: &str) -> Result<ThreadBinding> {
        let thread = self.create_thread().await?;
        self.bind(user_id, thread.id).await
    }

    /// Create a thread upstream without binding it to anyone
    pub async fn create_thread(&self) -> Result<AssistantThread> {
        let thread = self
            .assistant
            .create_thread()
            .await
            .context("Failed to create assistant thread")?;
        Ok(thread)
    }

    /// Bind `thread_id` to the user, unseeded
    pub async fn bind(&self, user_id: &str, thread_id: String) -> Result<ThreadBinding> {
        let binding = ThreadBinding::new(user_id, thread_id);
        self.persist.save_thread_binding(&binding).await?;

        tracing::info!(user_id, thread_id = %binding.thread_id, "Bound assistant thread");
        Ok(binding)
    }
}

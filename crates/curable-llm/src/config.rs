// Provider configuration and client construction

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;

/// Configuration for the OpenAI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL for OpenAI API (optional, defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Factory for creating LLM clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a client serving both completions and assistants; callers
    /// hand it out as `Arc<dyn ChatClient>` / `Arc<dyn AssistantClient>`.
    pub fn create_client(config: OpenAIConfig) -> Result<Arc<OpenAIClient>> {
        let mut client = OpenAIClient::new(config.api_key)?;
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_config_defaults_to_public_endpoint() {
        let config = OpenAIConfig::new("test-key");
        assert!(config.base_url.is_none());
        assert!(ClientFactory::create_client(config).is_ok());
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let config = OpenAIConfig::new("bad\nkey");
        assert!(ClientFactory::create_client(config).is_err());
    }
}

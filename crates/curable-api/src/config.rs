use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use curable_context::{InsightCacheConfig, RecordLimits};
use curable_conversation::PollConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub mongodb: MongoDbConfig,
    pub assistant: AssistantConfig,
    pub insights: InsightsConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub openai_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Hosted assistant to run; `ASSISTANT_ID` overrides
    #[serde(default)]
    pub assistant_id: Option<String>,
    pub summary_model: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub run_timeout_secs: u64,
}

impl AssistantConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new()
            .with_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_attempts(self.max_poll_attempts)
            .with_timeout(Duration::from_secs(self.run_timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsConfig {
    pub cache_ttl_hours: i64,
    pub analysis_model: String,
    pub checkin_limit: i64,
    pub mental_health_limit: i64,
}

impl InsightsConfig {
    pub fn cache_config(&self) -> InsightCacheConfig {
        InsightCacheConfig {
            ttl: chrono::Duration::hours(self.cache_ttl_hours),
            model: self.analysis_model.clone(),
        }
    }

    pub fn record_limits(&self) -> RecordLimits {
        RecordLimits {
            checkins: self.checkin_limit,
            mental_health: self.mental_health_limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `CURABLE_`-prefixed environment variables, `__` between levels
    ///    (e.g. `CURABLE_SERVER__PORT=9000`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CURABLE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.apply_secrets()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Assistant to run: `ASSISTANT_ID` if set, else the configured one
    pub fn assistant_id(&self) -> Option<&str> {
        self.assistant.assistant_id.as_deref().filter(|id| !id.is_empty())
    }

    // Secrets never live in TOML
    fn apply_secrets(&mut self) -> Result<(), ConfigError> {
        self.openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string()))?;

        if let Ok(assistant_id) = std::env::var("ASSISTANT_ID") {
            self.assistant.assistant_id = Some(assistant_id);
        }
        if self.assistant_id().is_none() {
            return Err(ConfigError::Message("ASSISTANT_ID environment variable is required".to_string()));
        }

        self.openai_base_url = std::env::var("OPENAI_BASE_URL").ok();

        if self.storage.backend == StorageBackend::Mongodb {
            self.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message("MONGODB_URI environment variable is required".to_string())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8000

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [storage]
        backend = "memory"

        [mongodb]
        database = "curable_test"

        [assistant]
        summary_model = "gpt-4o-mini"
        poll_interval_ms = 250
        max_poll_attempts = 40
        run_timeout_secs = 30

        [insights]
        cache_ttl_hours = 12
        analysis_model = "gpt-4o"
        checkin_limit = 2
        mental_health_limit = 3

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.mongodb.database, "curable_test");
        assert!(config.assistant_id().is_none());
    }

    #[test]
    fn test_storage_defaults_to_mongodb() {
        let toml = TOML.replace("[storage]\n        backend = \"memory\"", "");
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Mongodb);
    }

    #[test]
    fn test_component_settings() {
        let config: Config = toml::from_str(TOML).unwrap();

        let poll = config.assistant.poll_config();
        assert_eq!(poll.poll_interval, Duration::from_millis(250));
        assert_eq!(poll.max_poll_attempts, 40);
        assert_eq!(poll.run_timeout, Duration::from_secs(30));

        let cache = config.insights.cache_config();
        assert_eq!(cache.ttl, chrono::Duration::hours(12));
        assert_eq!(cache.model, "gpt-4o");

        let limits = config.insights.record_limits();
        assert_eq!(limits.checkins, 2);
        assert_eq!(limits.mental_health, 3);
    }
}

use std::sync::Arc;

use curable_context::{DefaultContextStrategy, InsightCache, ProfileSummarizer, SymptomAssessor};
use curable_conversation::{CleanupService, ConversationDriver};
use curable_llm::{AssistantClient, ChatClient};
use curable_persist::PersistenceClient;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Every service is built once at startup from the injected clients and
/// shared through `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub summarizer: Arc<ProfileSummarizer>,
    pub driver: Arc<ConversationDriver>,
    pub cleanup: Arc<CleanupService>,
    pub assessor: Arc<SymptomAssessor>,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: Arc<dyn PersistenceClient>,
        assistant: Arc<dyn AssistantClient>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        let summarizer = Arc::new(
            ProfileSummarizer::new(Arc::clone(&persist)).with_limits(config.insights.record_limits()),
        );
        let insight_cache = Arc::new(InsightCache::new(
            Arc::clone(&persist),
            Arc::clone(&chat),
            Arc::clone(&summarizer),
            config.insights.cache_config(),
        ));
        let context = Arc::new(DefaultContextStrategy::new(Arc::clone(&summarizer), insight_cache));

        let driver = ConversationDriver::new(
            Arc::clone(&assistant),
            Arc::clone(&persist),
            context,
            config.assistant_id().unwrap_or_default(),
        )
        .with_poll_config(config.assistant.poll_config());

        let cleanup = CleanupService::new(
            assistant,
            Arc::clone(&chat),
            Arc::clone(&persist),
            config.assistant.summary_model.clone(),
        );
        let assessor = SymptomAssessor::new(
            Arc::clone(&persist),
            chat,
            config.insights.analysis_model.clone(),
        );

        Self {
            config: Arc::new(config),
            persist,
            summarizer,
            driver: Arc::new(driver),
            cleanup: Arc::new(cleanup),
            assessor: Arc::new(assessor),
        }
    }
}

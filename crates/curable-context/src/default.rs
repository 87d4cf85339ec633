use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::insight_cache::InsightCache;
use crate::insights::build_greeting;
use crate::strategy::{ContextStrategy, SeedContext};
use crate::summarizer::ProfileSummarizer;

/// Profile summary + cached clinical analysis + insight greeting
pub struct DefaultContextStrategy {
    summarizer: Arc<ProfileSummarizer>,
    insight_cache: Arc<InsightCache>,
}

impl DefaultContextStrategy {
    pub fn new(summarizer: Arc<ProfileSummarizer>, insight_cache: Arc<InsightCache>) -> Self {
        Self {
            summarizer,
            insight_cache,
        }
    }
}

#[async_trait]
impl ContextStrategy for DefaultContextStrategy {
    async fn seed_context(&self, user_id: &str) -> Result<SeedContext> {
        let profile = self.summarizer.profile_summary(user_id).await;
        let clinical = self.insight_cache.clinical_context(user_id).await;

        tracing::debug!(
            user_id,
            source = ?clinical.source,
            insights = profile.insights.len(),
            "Built seed context"
        );

        let greeting = if profile.insights.is_empty() {
            None
        } else {
            Some(build_greeting(&profile.insights))
        };

        Ok(SeedContext {
            summary: profile.text,
            analysis: clinical.analysis().map(str::to_string),
            insights: profile.insights,
            greeting,
        })
    }
}

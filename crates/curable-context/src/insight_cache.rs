use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use curable_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use curable_persist::{
    ClinicalInsight, Medication, MentalHealthAssessment, Onboarding, PersistenceClient,
    SymptomAssessment, WeeklyCheckin,
};

use crate::summarizer::ProfileSummarizer;
use crate::templates::{CLINICAL_ANALYSIS_PROMPT, CLINICAL_ANALYSIS_SYSTEM_PROMPT};

#[derive(Debug, Clone)]
pub struct InsightCacheConfig {
    pub ttl: Duration,
    pub model: String,
}

impl Default for InsightCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Where a clinical context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    Cached,
    Fresh,
    /// Non-AI profile summary used after a failure
    Basic,
}

#[derive(Debug, Clone)]
pub struct ClinicalContext {
    pub source: InsightSource,
    /// AI analysis, or the basic profile summary for `Basic`
    pub text: String,
    pub insight: Option<ClinicalInsight>,
}

impl ClinicalContext {
    /// The AI analysis, if one is available
    pub fn analysis(&self) -> Option<&str> {
        match self.source {
            InsightSource::Basic => None,
            InsightSource::Cached | InsightSource::Fresh => Some(&self.text),
        }
    }
}

/// Full record history the analysis is computed from; stored as the insight snapshot
#[derive(Debug, Serialize)]
struct PatientSnapshot {
    onboarding: Option<Onboarding>,
    checkins: Vec<WeeklyCheckin>,
    mental_health: Vec<MentalHealthAssessment>,
    medications: Vec<Medication>,
    symptom_assessments: Vec<SymptomAssessment>,
}

/// Time-bounded cache of AI clinical analyses.
///
/// A lookup only sees rows with `expires_at > now`; expired rows stay in the
/// store and behave exactly like a miss.
pub struct InsightCache {
    persist: Arc<dyn PersistenceClient>,
    llm: Arc<dyn ChatClient>,
    summarizer: Arc<ProfileSummarizer>,
    config: InsightCacheConfig,
}

impl InsightCache {
    pub fn new(
        persist: Arc<dyn PersistenceClient>,
        llm: Arc<dyn ChatClient>,
        summarizer: Arc<ProfileSummarizer>,
        config: InsightCacheConfig,
    ) -> Self {
        Self {
            persist,
            llm,
            summarizer,
            config,
        }
    }

    pub async fn clinical_context(&self, user_id: &str) -> ClinicalContext {
        self.clinical_context_at(user_id, Utc::now()).await
    }

    /// Cached or freshly computed analysis as of `now`. Never fails: any error
    /// is logged and the basic profile summary is returned uncached.
    pub async fn clinical_context_at(&self, user_id: &str, now: DateTime<Utc>) -> ClinicalContext {
        match self.cached_or_fresh(user_id, now).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Clinical insight unavailable, using basic summary");
                ClinicalContext {
                    source: InsightSource::Basic,
                    text: self.summarizer.summarize(user_id).await,
                    insight: None,
                }
            }
        }
    }

    async fn cached_or_fresh(&self, user_id: &str, now: DateTime<Utc>) -> Result<ClinicalContext> {
        if let Some(insight) = self
            .persist
            .find_valid_insight(user_id, now)
            .await
            .context("Failed to look up cached insight")?
        {
            tracing::debug!(user_id, expires_at = %insight.expires_at, "Clinical insight cache hit");
            return Ok(ClinicalContext {
                source: InsightSource::Cached,
                text: insight.analysis.clone(),
                insight: Some(insight),
            });
        }

        let insight = self.compute(user_id, now).await?;
        self.persist
            .save_insight(insight.clone())
            .await
            .context("Failed to store clinical insight")?;

        tracing::info!(user_id, expires_at = %insight.expires_at, "Computed clinical insight");
        Ok(ClinicalContext {
            source: InsightSource::Fresh,
            text: insight.analysis.clone(),
            insight: Some(insight),
        })
    }

    async fn compute(&self, user_id: &str, now: DateTime<Utc>) -> Result<ClinicalInsight> {
        let snapshot = serde_json::to_value(self.load_snapshot(user_id).await?)?;
        let prompt = CLINICAL_ANALYSIS_PROMPT.replace("<records>", &serde_json::to_string_pretty(&snapshot)?);

        let request = ChatRequest::new(
            self.config.model.clone(),
            vec![Message::system(CLINICAL_ANALYSIS_SYSTEM_PROMPT), Message::human(prompt)],
        )
        .with_options(ChatOptions::new().temperature(0.2));

        let response = self.llm.chat(request).await.context("Clinical analysis call failed")?;
        let analysis = response.text()?.trim().to_string();
        if analysis.is_empty() {
            anyhow::bail!("Clinical analysis was empty");
        }

        Ok(ClinicalInsight::new(user_id, analysis, snapshot, now, self.config.ttl))
    }

    async fn load_snapshot(&self, user_id: &str) -> Result<PatientSnapshot> {
        let persist = self.persist.as_ref();
        Ok(PatientSnapshot {
            onboarding: persist.get_onboarding(user_id).await?,
            checkins: persist.recent_checkins(user_id, None).await?,
            mental_health: persist.recent_mental_health(user_id, None).await?,
            medications: persist.active_medications(user_id).await?,
            symptom_assessments: persist.recent_symptom_assessments(user_id, None).await?,
        })
    }
}

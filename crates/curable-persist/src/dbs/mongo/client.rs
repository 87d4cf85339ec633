use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::{Client, Database};

use crate::dbs::mongo::repositories::{
    MongoInsightRepository, MongoProfileRepository, MongoRecordRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{
    ChatSummary, ClinicalInsight, Medication, MentalHealthAssessment, Onboarding, Profile,
    SymptomAssessment, ThreadBinding, WeeklyCheckin,
};
use crate::trait_client::PersistenceClient;

pub struct MongoPersistenceClient {
    database: Database,
    profiles: MongoProfileRepository,
    onboarding: MongoRecordRepository<Onboarding>,
    checkins: MongoRecordRepository<WeeklyCheckin>,
    mental_health: MongoRecordRepository<MentalHealthAssessment>,
    medications: MongoRecordRepository<Medication>,
    symptom_assessments: MongoRecordRepository<SymptomAssessment>,
    chat_summaries: MongoRecordRepository<ChatSummary>,
    insights: MongoInsightRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database, "Connected to MongoDB");

        Ok(Self {
            database: client.database(database),
            profiles: MongoProfileRepository::new(&client, database),
            onboarding: MongoRecordRepository::new(&client, database, "onboarding"),
            checkins: MongoRecordRepository::new(&client, database, "weekly_checkins"),
            mental_health: MongoRecordRepository::new(&client, database, "mental_health_assessments"),
            medications: MongoRecordRepository::new(&client, database, "medications"),
            symptom_assessments: MongoRecordRepository::new(&client, database, "symptom_assessments"),
            chat_summaries: MongoRecordRepository::new(&client, database, "chat_summaries"),
            insights: MongoInsightRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_profile_by_name(&self, fragment: &str) -> Result<Option<Profile>> {
        self.profiles.find_by_name(fragment).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.profiles.get(user_id).await
    }

    async fn get_thread_binding(&self, user_id: &str) -> Result<Option<ThreadBinding>> {
        Ok(self
            .profiles
            .get(user_id)
            .await?
            .and_then(|profile| profile.thread_binding()))
    }

    async fn save_thread_binding(&self, binding: &ThreadBinding) -> Result<()> {
        self.profiles.save_binding(binding).await
    }

    async fn claim_context_seed(&self, user_id: &str, thread_id: &str) -> Result<bool> {
        self.profiles.claim_seed(user_id, thread_id).await
    }

    async fn release_context_seed(&self, user_id: &str, thread_id: &str) -> Result<()> {
        self.profiles.release_seed(user_id, thread_id).await
    }

    async fn get_onboarding(&self, user_id: &str) -> Result<Option<Onboarding>> {
        Ok(self.onboarding.latest_for_user(user_id, Some(1)).await?.pop())
    }

    async fn recent_checkins(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<WeeklyCheckin>> {
        self.checkins.latest_for_user(user_id, limit).await
    }

    async fn recent_mental_health(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<MentalHealthAssessment>> {
        self.mental_health.latest_for_user(user_id, limit).await
    }

    async fn active_medications(&self, user_id: &str) -> Result<Vec<Medication>> {
        // `null` also matches documents without the field
        self.medications
            .latest(doc! { "user_id": user_id, "end_date": null }, None)
            .await
    }

    async fn recent_symptom_assessments(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<SymptomAssessment>> {
        self.symptom_assessments.latest_for_user(user_id, limit).await
    }

    async fn save_symptom_assessment(&self, assessment: SymptomAssessment) -> Result<()> {
        self.symptom_assessments.insert(assessment).await
    }

    async fn find_valid_insight(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<ClinicalInsight>> {
        self.insights.find_valid(user_id, now).await
    }

    async fn save_insight(&self, insight: ClinicalInsight) -> Result<()> {
        self.insights.insert(insight).await
    }

    async fn save_chat_summary(&self, summary: ChatSummary) -> Result<()> {
        self.chat_summaries.insert(summary).await
    }
}

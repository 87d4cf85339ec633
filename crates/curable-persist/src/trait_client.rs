use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    ChatSummary, ClinicalInsight, Medication, MentalHealthAssessment, Onboarding, Profile,
    SymptomAssessment, ThreadBinding, WeeklyCheckin,
};

/// Trait for database persistence operations
///
/// Record reads return newest first. Implementations provide the
/// database-specific queries; callers only see agnostic models.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<()>;

    // Profiles and thread bindings

    /// First profile whose full name contains `fragment`, case-insensitively
    async fn find_profile_by_name(&self, fragment: &str) -> Result<Option<Profile>>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    async fn get_thread_binding(&self, user_id: &str) -> Result<Option<ThreadBinding>>;

    /// Store the binding on the user's profile, creating the profile if needed.
    /// Overwrites any previous binding.
    async fn save_thread_binding(&self, binding: &ThreadBinding) -> Result<()>;

    /// Atomically flip `context_seeded` from false to true for this exact
    /// thread. Returns whether this caller won the claim.
    async fn claim_context_seed(&self, user_id: &str, thread_id: &str) -> Result<bool>;

    /// Undo a claim after seeding failed
    async fn release_context_seed(&self, user_id: &str, thread_id: &str) -> Result<()>;

    // Health records

    async fn get_onboarding(&self, user_id: &str) -> Result<Option<Onboarding>>;

    async fn recent_checkins(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<WeeklyCheckin>>;

    async fn recent_mental_health(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<MentalHealthAssessment>>;

    async fn active_medications(&self, user_id: &str) -> Result<Vec<Medication>>;

    async fn recent_symptom_assessments(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<SymptomAssessment>>;

    async fn save_symptom_assessment(&self, assessment: SymptomAssessment) -> Result<()>;

    // Clinical insight cache

    /// Newest insight for the user with `expires_at > now`
    async fn find_valid_insight(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<ClinicalInsight>>;

    async fn save_insight(&self, insight: ClinicalInsight) -> Result<()>;

    // Conversation summaries

    async fn save_chat_summary(&self, summary: ChatSummary) -> Result<()>;
}

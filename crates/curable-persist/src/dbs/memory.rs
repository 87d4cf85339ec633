use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{
    ChatSummary, ClinicalInsight, Medication, MentalHealthAssessment, Onboarding, Profile,
    SymptomAssessment, ThreadBinding, WeeklyCheckin,
};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct MemoryState {
    profiles: Vec<Profile>,
    onboarding: Vec<Onboarding>,
    checkins: Vec<WeeklyCheckin>,
    mental_health: Vec<MentalHealthAssessment>,
    medications: Vec<Medication>,
    symptom_assessments: Vec<SymptomAssessment>,
    insights: Vec<ClinicalInsight>,
    chat_summaries: Vec<ChatSummary>,
}

/// In-process store implementing the full storage contract.
///
/// Used for local runs (`storage.backend = "memory"`) and tests.
#[derive(Default)]
pub struct MemoryPersistenceClient {
    state: RwLock<MemoryState>,
    fail_record_reads: AtomicBool,
    writes: RwLock<HashMap<&'static str, usize>>,
}

fn newest_first<T, F>(mut rows: Vec<T>, created_at: F, limit: Option<i64>) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    if let Some(limit) = limit {
        rows.truncate(limit.max(0) as usize);
    }
    rows
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every health-record read fail (simulates an unreachable store)
    pub fn fail_record_reads(&self, fail: bool) {
        self.fail_record_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn insert_profile(&self, profile: Profile) {
        let mut state = self.state.write().await;
        state.profiles.retain(|p| p.id != profile.id);
        state.profiles.push(profile);
    }

    pub async fn insert_onboarding(&self, onboarding: Onboarding) {
        self.state.write().await.onboarding.push(onboarding);
    }

    pub async fn insert_checkin(&self, checkin: WeeklyCheckin) {
        self.state.write().await.checkins.push(checkin);
    }

    pub async fn insert_mental_health(&self, assessment: MentalHealthAssessment) {
        self.state.write().await.mental_health.push(assessment);
    }

    pub async fn insert_medication(&self, medication: Medication) {
        self.state.write().await.medications.push(medication);
    }

    pub async fn chat_summaries(&self, user_id: &str) -> Vec<ChatSummary> {
        self.state
            .read()
            .await
            .chat_summaries
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every stored insight row for the user, expired ones included
    pub async fn insights(&self, user_id: &str) -> Vec<ClinicalInsight> {
        self.state
            .read()
            .await
            .insights
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn symptom_assessments(&self, user_id: &str) -> Vec<SymptomAssessment> {
        self.state
            .read()
            .await
            .symptom_assessments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Number of write operations performed, across all collections
    pub async fn write_count(&self) -> usize {
        self.writes.read().await.values().sum()
    }

    async fn record_write(&self, collection: &'static str) {
        *self.writes.write().await.entry(collection).or_insert(0) += 1;
    }

    fn check_record_reads(&self) -> Result<()> {
        if self.fail_record_reads.load(Ordering::SeqCst) {
            return Err(PersistError::Connection("record reads disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_profile_by_name(&self, fragment: &str) -> Result<Option<Profile>> {
        let needle = fragment.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .profiles
            .iter()
            .find(|p| {
                p.full_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn get_thread_binding(&self, user_id: &str) -> Result<Option<ThreadBinding>> {
        Ok(self
            .get_profile(user_id)
            .await?
            .and_then(|profile| profile.thread_binding()))
    }

    async fn save_thread_binding(&self, binding: &ThreadBinding) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let index = match state.profiles.iter().position(|p| p.id == binding.user_id) {
                Some(index) => index,
                None => {
                    state.profiles.push(Profile::new(binding.user_id.clone()));
                    state.profiles.len() - 1
                }
            };
            let profile = &mut state.profiles[index];
            profile.thread_id = Some(binding.thread_id.clone());
            profile.context_seeded = binding.context_seeded;
            profile.thread_updated_at = Some(Utc::now());
        }
        self.record_write("profiles").await;
        Ok(())
    }

    async fn claim_context_seed(&self, user_id: &str, thread_id: &str) -> Result<bool> {
        let claimed = {
            let mut state = self.state.write().await;
            match state.profiles.iter_mut().find(|p| {
                p.id == user_id && p.thread_id.as_deref() == Some(thread_id) && !p.context_seeded
            }) {
                Some(profile) => {
                    profile.context_seeded = true;
                    true
                }
                None => false,
            }
        };
        if claimed {
            self.record_write("profiles").await;
        }
        Ok(claimed)
    }

    async fn release_context_seed(&self, user_id: &str, thread_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(profile) = state
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id && p.thread_id.as_deref() == Some(thread_id))
        {
            profile.context_seeded = false;
        }
        Ok(())
    }

    async fn get_onboarding(&self, user_id: &str) -> Result<Option<Onboarding>> {
        self.check_record_reads()?;
        let state = self.state.read().await;
        let rows = state.onboarding.iter().filter(|o| o.user_id == user_id).cloned().collect();
        Ok(newest_first(rows, |o: &Onboarding| o.created_at, Some(1)).pop())
    }

    async fn recent_checkins(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<WeeklyCheckin>> {
        self.check_record_reads()?;
        let state = self.state.read().await;
        let rows = state.checkins.iter().filter(|c| c.user_id == user_id).cloned().collect();
        Ok(newest_first(rows, |c: &WeeklyCheckin| c.created_at, limit))
    }

    async fn recent_mental_health(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<MentalHealthAssessment>> {
        self.check_record_reads()?;
        let state = self.state.read().await;
        let rows = state.mental_health.iter().filter(|m| m.user_id == user_id).cloned().collect();
        Ok(newest_first(rows, |m: &MentalHealthAssessment| m.created_at, limit))
    }

    async fn active_medications(&self, user_id: &str) -> Result<Vec<Medication>> {
        self.check_record_reads()?;
        let state = self.state.read().await;
        let rows = state
            .medications
            .iter()
            .filter(|m| m.user_id == user_id && m.is_active())
            .cloned()
            .collect();
        Ok(newest_first(rows, |m: &Medication| m.created_at, None))
    }

    async fn recent_symptom_assessments(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<SymptomAssessment>> {
        self.check_record_reads()?;
        let state = self.state.read().await;
        let rows = state
            .symptom_assessments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &SymptomAssessment| a.created_at, limit))
    }

    async fn save_symptom_assessment(&self, assessment: SymptomAssessment) -> Result<()> {
        self.state.write().await.symptom_assessments.push(assessment);
        self.record_write("symptom_assessments").await;
        Ok(())
    }

    async fn find_valid_insight(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<ClinicalInsight>> {
        let state = self.state.read().await;
        let rows = state
            .insights
            .iter()
            .filter(|i| i.user_id == user_id && i.is_valid_at(now))
            .cloned()
            .collect();
        Ok(newest_first(rows, |i: &ClinicalInsight| i.created_at, Some(1)).pop())
    }

    async fn save_insight(&self, insight: ClinicalInsight) -> Result<()> {
        self.state.write().await.insights.push(insight);
        self.record_write("clinical_insights").await;
        Ok(())
    }

    async fn save_chat_summary(&self, summary: ChatSummary) -> Result<()> {
        self.state.write().await.chat_summaries.push(summary);
        self.record_write("chat_summaries").await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_binding_roundtrip_creates_profile() {
        let store = MemoryPersistenceClient::new();
        assert!(store.get_thread_binding("u1").await.unwrap().is_none());

        store.save_thread_binding(&ThreadBinding::new("u1", "thread_1")).await.unwrap();

        let binding = store.get_thread_binding("u1").await.unwrap().unwrap();
        assert_eq!(binding.thread_id, "thread_1");
        assert!(!binding.context_seeded);
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_seed_claim_only_once_per_thread() {
        let store = MemoryPersistenceClient::new();
        store.save_thread_binding(&ThreadBinding::new("u1", "thread_1")).await.unwrap();

        assert!(store.claim_context_seed("u1", "thread_1").await.unwrap());
        assert!(!store.claim_context_seed("u1", "thread_1").await.unwrap());
        assert!(!store.claim_context_seed("u1", "other_thread").await.unwrap());

        store.release_context_seed("u1", "thread_1").await.unwrap();
        assert!(store.claim_context_seed("u1", "thread_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_recent_checkins_newest_first_with_limit() {
        let store = MemoryPersistenceClient::new();
        let now = Utc::now();
        for days in [3, 1, 2] {
            let mut checkin = WeeklyCheckin::new("u1", now - Duration::days(days));
            checkin.average_sleep_hours = Some(days as f64);
            store.insert_checkin(checkin).await;
        }

        let rows = store.recent_checkins("u1", Some(2)).await.unwrap();
        let hours: Vec<_> = rows.iter().map(|c| c.average_sleep_hours.unwrap()).collect();
        assert_eq!(hours, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_expired_insight_is_skipped() {
        let store = MemoryPersistenceClient::new();
        let now = Utc::now();
        let stale = ClinicalInsight::new("u1", "old", serde_json::json!({}), now - Duration::hours(30), Duration::hours(24));
        store.save_insight(stale).await.unwrap();

        assert!(store.find_valid_insight("u1", now).await.unwrap().is_none());
        assert_eq!(store.insights("u1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_profile_name_match_is_case_insensitive() {
        let store = MemoryPersistenceClient::new();
        store.insert_profile(Profile::new("u1").with_name("Ada Obi")).await;

        let found = store.find_profile_by_name("obi").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some("u1".to_string()));
        assert!(store.find_profile_by_name("zed").await.unwrap().is_none());
    }
}

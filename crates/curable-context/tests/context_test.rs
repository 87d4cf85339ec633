use std::sync::Arc;

use chrono::{Duration, Utc};
use curable_context::{
    ContextStrategy, DefaultContextStrategy, InsightCache, InsightCacheConfig, InsightSource,
    ProfileSummarizer, SymptomAssessor, NO_PROFILE_DATA,
};
use curable_llm::testing::ScriptedChat;
use curable_llm::ResponseFormat;
use curable_persist::{
    ClinicalInsight, MemoryPersistenceClient, MetricRating, Onboarding, PersistenceClient,
    WeeklyCheckin,
};

struct Fixture {
    store: Arc<MemoryPersistenceClient>,
    chat: Arc<ScriptedChat>,
    cache: InsightCache,
}

fn fixture(chat: ScriptedChat) -> Fixture {
    let store = Arc::new(MemoryPersistenceClient::new());
    let chat = Arc::new(chat);
    let summarizer = Arc::new(ProfileSummarizer::new(store.clone()));
    let cache = InsightCache::new(store.clone(), chat.clone(), summarizer, InsightCacheConfig::default());
    Fixture { store, chat, cache }
}

async fn seed_checkins(store: &MemoryPersistenceClient, user_id: &str) {
    let mut previous = WeeklyCheckin::new(user_id, Utc::now() - Duration::days(7));
    previous.stress = MetricRating::rated(3);
    let mut latest = WeeklyCheckin::new(user_id, Utc::now());
    latest.stress = MetricRating::rated(8).with_notes("deadlines");
    store.insert_checkin(previous).await;
    store.insert_checkin(latest).await;
}

#[tokio::test]
async fn test_summarizer_placeholder_for_user_without_records() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let summarizer = ProfileSummarizer::new(store);
    assert_eq!(summarizer.summarize("nobody").await, NO_PROFILE_DATA);
}

#[tokio::test]
async fn test_summarizer_placeholder_on_read_failure() {
    let store = Arc::new(MemoryPersistenceClient::new());
    seed_checkins(&store, "u1").await;
    store.fail_record_reads(true);

    let summarizer = ProfileSummarizer::new(store);
    assert_eq!(summarizer.summarize("u1").await, NO_PROFILE_DATA);
}

#[tokio::test]
async fn test_summarizer_reports_trend() {
    let store = Arc::new(MemoryPersistenceClient::new());
    seed_checkins(&store, "u1").await;

    let summary = ProfileSummarizer::new(store).profile_summary("u1").await;
    assert!(summary.text.starts_with("Patient Profile Summary:\n"));
    assert!(summary.text.contains("stress: 8/10 (deadlines)"));
    assert_eq!(summary.insights[0], "stress rose from 3 to 8 since your last check-in");
}

#[tokio::test]
async fn test_cache_miss_computes_and_stores() {
    let f = fixture(ScriptedChat::replying("Stress is climbing; ask about workload."));
    seed_checkins(&f.store, "u1").await;

    let context = f.cache.clinical_context("u1").await;

    assert_eq!(context.source, InsightSource::Fresh);
    assert_eq!(context.analysis(), Some("Stress is climbing; ask about workload."));
    assert_eq!(f.chat.calls(), 1);

    let stored = f.store.insights("u1").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].snapshot["checkins"].as_array().map(Vec::len), Some(2));
    assert_eq!(stored[0].expires_at - stored[0].created_at, Duration::hours(24));
}

#[tokio::test]
async fn test_cache_hit_skips_llm() {
    let f = fixture(ScriptedChat::replying("fresh analysis"));
    let now = Utc::now();
    f.store
        .save_insight(ClinicalInsight::new("u1", "cached analysis", serde_json::json!({}), now, Duration::hours(24)))
        .await
        .unwrap();

    let context = f.cache.clinical_context_at("u1", now + Duration::hours(1)).await;

    assert_eq!(context.source, InsightSource::Cached);
    assert_eq!(context.text, "cached analysis");
    assert_eq!(f.chat.calls(), 0);
}

#[tokio::test]
async fn test_expired_row_behaves_like_miss() {
    let f = fixture(ScriptedChat::replying("recomputed"));
    let now = Utc::now();
    f.store
        .save_insight(ClinicalInsight::new(
            "u1",
            "stale analysis",
            serde_json::json!({}),
            now - Duration::hours(25),
            Duration::hours(24),
        ))
        .await
        .unwrap();

    let context = f.cache.clinical_context_at("u1", now).await;

    assert_eq!(context.source, InsightSource::Fresh);
    assert_eq!(context.text, "recomputed");
    assert_eq!(f.chat.calls(), 1);
    // expired row is superseded, not removed
    assert_eq!(f.store.insights("u1").await.len(), 2);
}

#[tokio::test]
async fn test_llm_failure_falls_back_to_basic_summary() {
    let f = fixture(ScriptedChat::failing("OpenAI API error (503 Service Unavailable)"));
    seed_checkins(&f.store, "u1").await;

    let context = f.cache.clinical_context("u1").await;

    assert_eq!(context.source, InsightSource::Basic);
    assert!(context.analysis().is_none());
    assert!(context.text.starts_with("Patient Profile Summary:"));
    assert!(f.store.insights("u1").await.is_empty());
    assert_eq!(f.chat.calls(), 1);
}

#[tokio::test]
async fn test_seed_context_includes_greeting_when_insights_exist() {
    let store = Arc::new(MemoryPersistenceClient::new());
    seed_checkins(&store, "u1").await;
    let summarizer = Arc::new(ProfileSummarizer::new(store.clone()));
    let cache = Arc::new(InsightCache::new(
        store.clone(),
        Arc::new(ScriptedChat::replying("Watch the stress trend.")),
        summarizer.clone(),
        InsightCacheConfig::default(),
    ));
    let strategy = DefaultContextStrategy::new(summarizer, cache);

    let seed = strategy.seed_context("u1").await.unwrap();

    assert_eq!(seed.analysis.as_deref(), Some("Watch the stress trend."));
    assert!(seed.greeting.as_ref().unwrap().contains("stress rose from 3 to 8"));
    assert!(seed.seed_message().starts_with("Here is my medical profile:\nPatient Profile Summary:"));
    assert!(seed.seed_message().ends_with("\n\nClinical insight:\nWatch the stress trend."));
}

#[tokio::test]
async fn test_seed_context_without_records_has_no_greeting() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let summarizer = Arc::new(ProfileSummarizer::new(store.clone()));
    let cache = Arc::new(InsightCache::new(
        store.clone(),
        Arc::new(ScriptedChat::failing("down")),
        summarizer.clone(),
        InsightCacheConfig::default(),
    ));
    let strategy = DefaultContextStrategy::new(summarizer, cache);

    let seed = strategy.seed_context("u1").await.unwrap();

    assert_eq!(seed.summary, NO_PROFILE_DATA);
    assert!(seed.analysis.is_none());
    assert!(seed.greeting.is_none());
    assert!(seed.insights.is_empty());
}

#[tokio::test]
async fn test_symptom_assessment_is_parsed_and_stored() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let mut onboarding = Onboarding::new("u1");
    onboarding.chronic_conditions = vec!["asthma".to_string()];
    store.insert_onboarding(onboarding).await;

    let chat = Arc::new(ScriptedChat::replying(
        serde_json::json!({
            "summary": "Probably a viral cold",
            "quick_remedy": ["Rest", "Fluids"],
            "suspected_conditions": ["Common cold"],
            "confidence_score": 70,
            "urgency_level": "low",
            "recommendations": ["See a doctor if fever persists"],
            "red_flags": ["Difficulty breathing"],
            "follow_up_timeline": "Within 3 days",
            "disclaimer": "AI can be wrong."
        })
        .to_string(),
    ));
    let assessor = SymptomAssessor::new(store.clone(), chat.clone(), "gpt-4o-mini");

    let assessment = assessor.assess("u1", "runny nose and cough").await.unwrap();

    assert_eq!(assessment.ai_diagnosis, "Probably a viral cold");
    assert_eq!(assessment.quick_remedy, vec!["Rest", "Fluids"]);
    assert_eq!(assessment.urgency_level.as_deref(), Some("low"));
    assert_eq!(store.symptom_assessments("u1").await.len(), 1);

    let request = &chat.requests()[0];
    assert_eq!(request.options.response_format, Some(ResponseFormat::JsonObject));
    let prompt = request.messages[1].content().to_text();
    assert!(prompt.contains("runny nose and cough"));
    assert!(prompt.contains("asthma"));
}

#[tokio::test]
async fn test_symptom_assessment_rejects_non_json() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let assessor = SymptomAssessor::new(
        store.clone(),
        Arc::new(ScriptedChat::replying("I think you have a cold")),
        "gpt-4o-mini",
    );

    assert!(assessor.assess("u1", "cough").await.is_err());
    assert!(store.symptom_assessments("u1").await.is_empty());
}

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use curable_persist::{
    ClinicalInsight, Medication, MemoryPersistenceClient, PersistenceClient, ThreadBinding,
};

#[tokio::test]
async fn test_concurrent_seed_claims_have_one_winner() {
    let store = Arc::new(MemoryPersistenceClient::new());
    store
        .save_thread_binding(&ThreadBinding::new("u1", "thread_1"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.claim_context_seed("u1", "thread_1").await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_rebinding_resets_seed_flag() {
    let store = MemoryPersistenceClient::new();
    store
        .save_thread_binding(&ThreadBinding::new("u1", "thread_1"))
        .await
        .unwrap();
    assert!(store.claim_context_seed("u1", "thread_1").await.unwrap());

    store
        .save_thread_binding(&ThreadBinding::new("u1", "thread_2"))
        .await
        .unwrap();

    let binding = store.get_thread_binding("u1").await.unwrap().unwrap();
    assert_eq!(binding.thread_id, "thread_2");
    assert!(!binding.context_seeded);
}

#[tokio::test]
async fn test_only_active_medications_returned() {
    let store = MemoryPersistenceClient::new();
    store.insert_medication(Medication::new("u1", "Metformin")).await;

    let mut stopped = Medication::new("u1", "Ibuprofen");
    stopped.end_date = NaiveDate::from_ymd_opt(2024, 3, 1);
    store.insert_medication(stopped).await;

    let active = store.active_medications("u1").await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].medication_name, "Metformin");
}

#[tokio::test]
async fn test_newest_valid_insight_wins() {
    let store = MemoryPersistenceClient::new();
    let now = Utc::now();
    let older = ClinicalInsight::new("u1", "older", serde_json::json!({}), now - Duration::hours(2), Duration::hours(24));
    let newer = ClinicalInsight::new("u1", "newer", serde_json::json!({}), now - Duration::hours(1), Duration::hours(24));
    store.save_insight(older).await.unwrap();
    store.save_insight(newer).await.unwrap();

    let found = store.find_valid_insight("u1", now).await.unwrap().unwrap();
    assert_eq!(found.analysis, "newer");
}

#[tokio::test]
async fn test_failed_record_reads_surface_errors() {
    let store = MemoryPersistenceClient::new();
    store.fail_record_reads(true);

    assert!(store.recent_checkins("u1", Some(2)).await.is_err());
    assert!(store.get_onboarding("u1").await.is_err());
}

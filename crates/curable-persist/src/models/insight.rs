use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cached AI clinical analysis (collection `clinical_insights`).
///
/// Rows are never updated; a newer row supersedes older ones and expired
/// rows are skipped by lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInsight {
    pub id: String,
    pub user_id: String,
    pub analysis: String,
    /// Patient context the analysis was computed from
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ClinicalInsight {
    pub fn new(
        user_id: impl Into<String>,
        analysis: impl Into<String>,
        snapshot: serde_json::Value,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            analysis: analysis.into(),
            snapshot,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Rolling conversation summary written by cleanup (collection `chat_summaries`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub user_id: String,
    pub thread_id: String,
    pub summary: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ChatSummary {
    pub fn new(
        user_id: impl Into<String>,
        thread_id: impl Into<String>,
        summary: impl Into<String>,
        message_count: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            thread_id: thread_id.into(),
            summary: summary.into(),
            message_count,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_expiry_is_exclusive() {
        let created = Utc::now();
        let insight = ClinicalInsight::new("u1", "stable", serde_json::json!({}), created, Duration::hours(24));

        assert!(insight.is_valid_at(created));
        assert!(insight.is_valid_at(created + Duration::hours(23)));
        assert!(!insight.is_valid_at(created + Duration::hours(24)));
    }
}

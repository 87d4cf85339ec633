use anyhow::Result;
use async_trait::async_trait;

use crate::templates::{CLINICAL_INSIGHT_HEADER, PROFILE_SEED_PREFIX};

/// Context injected into a thread before the user's first message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedContext {
    pub summary: String,
    pub analysis: Option<String>,
    pub insights: Vec<String>,
    /// Proactive assistant opener, present when there is something to flag
    pub greeting: Option<String>,
}

impl SeedContext {
    /// User-role message carrying the profile (and analysis, when available)
    pub fn seed_message(&self) -> String {
        let mut message = format!("{}{}", PROFILE_SEED_PREFIX, self.summary);
        if let Some(analysis) = &self.analysis {
            message.push_str(CLINICAL_INSIGHT_HEADER);
            message.push_str(analysis);
        }
        message
    }
}

/// Strategy for building the first-turn context of a conversation
#[async_trait]
pub trait ContextStrategy: Send + Sync {
    async fn seed_context(&self, user_id: &str) -> Result<SeedContext>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_message_without_analysis() {
        let seed = SeedContext {
            summary: "No profile data available.".to_string(),
            ..Default::default()
        };
        assert_eq!(seed.seed_message(), "Here is my medical profile:\nNo profile data available.");
    }

    #[test]
    fn test_seed_message_with_analysis() {
        let seed = SeedContext {
            summary: "Patient Profile Summary:".to_string(),
            analysis: Some("Sleep is trending down.".to_string()),
            ..Default::default()
        };
        assert_eq!(
            seed.seed_message(),
            "Here is my medical profile:\nPatient Profile Summary:\n\nClinical insight:\nSleep is trending down."
        );
    }
}

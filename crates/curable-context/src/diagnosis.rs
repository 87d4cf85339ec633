use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use curable_llm::{ChatClient, ChatOptions, ChatRequest, Message, ResponseFormat};
use curable_persist::{PersistenceClient, SymptomAssessment};

use crate::templates::{DEFAULT_DISCLAIMER, SYMPTOM_ASSESSMENT_PROMPT, SYMPTOM_ASSESSMENT_SYSTEM_PROMPT};

const RECENT_CHECKINS: i64 = 7;
const PREVIOUS_ASSESSMENTS: i64 = 10;
const MAX_COMPLETION_TOKENS: u32 = 1000;

/// JSON object the model is asked to produce
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub quick_remedy: Vec<String>,
    #[serde(default)]
    pub suspected_conditions: Vec<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub follow_up_timeline: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
}

impl AssessmentReport {
    fn into_assessment(self, user_id: &str, symptoms: &str) -> SymptomAssessment {
        SymptomAssessment {
            ai_diagnosis: self.summary,
            suspected_conditions: self.suspected_conditions,
            recommendations: self.recommendations,
            quick_remedy: self.quick_remedy,
            red_flags: self.red_flags,
            confidence_score: self.confidence_score.map(|score| score.clamp(0.0, 100.0)),
            urgency_level: self.urgency_level,
            follow_up_timeline: self.follow_up_timeline,
            disclaimer: Some(
                self.disclaimer
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DISCLAIMER.to_string()),
            ),
            doctor_reviewed: false,
            created_at: Utc::now(),
            ..SymptomAssessment::new(user_id, symptoms)
        }
    }
}

/// Structured AI assessment of reported symptoms against the patient's history
pub struct SymptomAssessor {
    persist: Arc<dyn PersistenceClient>,
    llm: Arc<dyn ChatClient>,
    model: String,
}

impl SymptomAssessor {
    pub fn new(persist: Arc<dyn PersistenceClient>, llm: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            persist,
            llm,
            model: model.into(),
        }
    }

    /// Assess `symptoms`, store the result and return it
    pub async fn assess(&self, user_id: &str, symptoms: &str) -> Result<SymptomAssessment> {
        let context = self.patient_context(user_id, symptoms).await?;
        let prompt = SYMPTOM_ASSESSMENT_PROMPT.replace("<context>", &serde_json::to_string_pretty(&context)?);

        let request = ChatRequest::new(
            self.model.clone(),
            vec![Message::system(SYMPTOM_ASSESSMENT_SYSTEM_PROMPT), Message::human(prompt)],
        )
        .with_options(
            ChatOptions::new()
                .max_tokens(MAX_COMPLETION_TOKENS)
                .response_format(ResponseFormat::JsonObject),
        );

        let response = self.llm.chat(request).await.context("Symptom assessment call failed")?;
        let report: AssessmentReport = serde_json::from_str(response.text()?)
            .context("Symptom assessment was not valid JSON")?;

        let assessment = report.into_assessment(user_id, symptoms);
        self.persist
            .save_symptom_assessment(assessment.clone())
            .await
            .context("Failed to store symptom assessment")?;

        tracing::info!(
            user_id,
            assessment_id = %assessment.id,
            urgency = assessment.urgency_level.as_deref().unwrap_or("unknown"),
            "Symptom assessment stored"
        );
        Ok(assessment)
    }

    async fn patient_context(&self, user_id: &str, symptoms: &str) -> Result<serde_json::Value> {
        let persist = self.persist.as_ref();
        let profile = persist.get_profile(user_id).await?;
        let onboarding = persist.get_onboarding(user_id).await?;
        let checkins = persist.recent_checkins(user_id, Some(RECENT_CHECKINS)).await?;
        let medications = persist.active_medications(user_id).await?;
        let previous = persist
            .recent_symptom_assessments(user_id, Some(PREVIOUS_ASSESSMENTS))
            .await?;
        let mental_health = persist.recent_mental_health(user_id, Some(1)).await?;

        Ok(json!({
            "demographics": {
                "age": profile.as_ref().and_then(|p| p.age),
                "gender": profile.as_ref().and_then(|p| p.gender.clone())
                    .or_else(|| onboarding.as_ref().and_then(|o| o.gender.clone())),
                "bmi": profile.as_ref().and_then(|p| p.bmi)
                    .or_else(|| onboarding.as_ref().and_then(|o| o.bmi)),
                "blood_group": profile.as_ref().and_then(|p| p.blood_group.clone())
                    .or_else(|| onboarding.as_ref().and_then(|o| o.blood_group.clone())),
                "chronic_conditions": onboarding.as_ref().map(|o| o.chronic_conditions.clone()).unwrap_or_default(),
            },
            "current_symptoms": symptoms,
            "recent_checkins": checkins,
            "current_medications": medications.iter().map(|m| json!({
                "name": m.medication_name,
                "dosage": m.dosage,
                "frequency": m.frequency,
                "is_prescribed": m.is_prescribed,
            })).collect::<Vec<_>>(),
            "medical_history": {
                "previous_assessments": previous.iter().map(|a| json!({
                    "symptoms": a.symptoms,
                    "diagnosis": a.ai_diagnosis,
                    "conditions": a.suspected_conditions,
                    "urgency": a.urgency_level,
                    "date": a.created_at,
                })).collect::<Vec<_>>(),
                "mental_health_status": mental_health.first().map(|m| json!({
                    "latest_mood_score": m.mood_score,
                    "stress_anxiety": m.stress_anxiety_overwhelm,
                    "sleep_changes": m.sleep_changes,
                    "is_urgent": m.is_flagged_urgent,
                })),
            },
        }))
    }
}

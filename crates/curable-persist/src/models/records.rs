use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Onboarding questionnaire (collection `onboarding`), one per user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Onboarding {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub long_term_medications: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<String>,
    #[serde(default)]
    pub smoker: Option<bool>,
    #[serde(default)]
    pub alcohol_drinker: Option<bool>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Onboarding {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            created_at: Utc::now(),
            ..Default::default()
        }
    }
}

/// A self-reported 1-10 rating with optional free-text elaboration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRating {
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MetricRating {
    pub fn rated(rating: u8) -> Self {
        Self {
            rating: Some(rating),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Weekly check-in (collection `weekly_checkins`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyCheckin {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub average_sleep_hours: Option<f64>,
    #[serde(default)]
    pub exercise_frequency_per_week: Option<u32>,
    #[serde(default)]
    pub sleep_quality: MetricRating,
    #[serde(default)]
    pub energy: MetricRating,
    #[serde(default)]
    pub stress: MetricRating,
    #[serde(default)]
    pub mood: MetricRating,
    #[serde(default)]
    pub lifestyle_changes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WeeklyCheckin {
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            created_at,
            ..Default::default()
        }
    }
}

/// Mental-health questionnaire (collection `mental_health_assessments`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentalHealthAssessment {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub feeling_today: Option<String>,
    #[serde(default)]
    pub mood_score: Option<u8>,
    #[serde(default)]
    pub stress_anxiety_overwhelm: Option<bool>,
    #[serde(default)]
    pub stress_anxiety_details: Option<String>,
    #[serde(default)]
    pub thought_heaviness_scale: Option<u8>,
    #[serde(default)]
    pub sleep_changes: Option<String>,
    #[serde(default)]
    pub hopelessness_loss_interest: Option<bool>,
    #[serde(default)]
    pub hopelessness_explanation: Option<String>,
    #[serde(default)]
    pub has_support_person: Option<bool>,
    #[serde(default)]
    pub is_flagged_urgent: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl MentalHealthAssessment {
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            created_at,
            ..Default::default()
        }
    }
}

/// Medication entry (collection `medications`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub user_id: String,
    pub medication_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub is_prescribed: Option<bool>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    pub fn new(user_id: impl Into<String>, medication_name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            medication_name: medication_name.into(),
            created_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Still being taken (no end date recorded)
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Stored result of an AI symptom assessment (collection `symptom_assessments`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomAssessment {
    pub id: String,
    pub user_id: String,
    pub symptoms: String,
    /// Assessment summary written by the model
    pub ai_diagnosis: String,
    #[serde(default)]
    pub suspected_conditions: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub quick_remedy: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub follow_up_timeline: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub doctor_reviewed: bool,
    pub created_at: DateTime<Utc>,
}

impl SymptomAssessment {
    pub fn new(user_id: impl Into<String>, symptoms: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            symptoms: symptoms.into(),
            created_at: Utc::now(),
            ..Default::default()
        }
    }
}

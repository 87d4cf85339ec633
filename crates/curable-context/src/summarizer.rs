use std::sync::Arc;

use curable_persist::PersistenceClient;

use crate::descriptors::{
    render_fields, CHECKIN_FIELDS, DEMOGRAPHIC_FIELDS, MEDICATION_FIELDS, MENTAL_HEALTH_FIELDS,
};
use crate::insights::derive_insights;
use crate::records::{PatientRecords, RecordLimits};

pub const SUMMARY_HEADER: &str = "Patient Profile Summary:";

/// Returned whenever there is nothing (or nothing readable) to summarize
pub const NO_PROFILE_DATA: &str = "No profile data available.";

/// Summary text plus the insight phrases it contains
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSummary {
    pub text: String,
    pub insights: Vec<String>,
}

impl ProfileSummary {
    fn placeholder() -> Self {
        Self {
            text: NO_PROFILE_DATA.to_string(),
            insights: Vec::new(),
        }
    }
}

/// Renders a user's health records into a text block for the assistant
pub struct ProfileSummarizer {
    persist: Arc<dyn PersistenceClient>,
    limits: RecordLimits,
}

impl ProfileSummarizer {
    pub fn new(persist: Arc<dyn PersistenceClient>) -> Self {
        Self {
            persist,
            limits: RecordLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RecordLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Summary text; never fails
    pub async fn summarize(&self, user_id: &str) -> String {
        self.profile_summary(user_id).await.text
    }

    /// Summary and insights; a failed read degrades to the placeholder
    pub async fn profile_summary(&self, user_id: &str) -> ProfileSummary {
        match PatientRecords::load(self.persist.as_ref(), user_id, self.limits).await {
            Ok(records) => render_summary(&records),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load profile records");
                ProfileSummary::placeholder()
            }
        }
    }
}

/// Render loaded records. Empty categories are left out.
pub fn render_summary(records: &PatientRecords) -> ProfileSummary {
    if records.is_empty() {
        return ProfileSummary::placeholder();
    }

    let mut sections = vec![SUMMARY_HEADER.to_string()];

    if let Some(onboarding) = &records.onboarding {
        let fields = render_fields(DEMOGRAPHIC_FIELDS, onboarding);
        if !fields.is_empty() {
            sections.push(bullet_section("Demographics:", fields));
        }
    }

    if !records.checkins.is_empty() {
        let lines = records
            .checkins
            .iter()
            .map(|checkin| {
                dated_line(
                    &checkin.created_at.format("%Y-%m-%d").to_string(),
                    render_fields(CHECKIN_FIELDS, checkin),
                )
            })
            .collect();
        sections.push(bullet_section("Recent check-ins:", lines));
    }

    if !records.mental_health.is_empty() {
        let lines = records
            .mental_health
            .iter()
            .map(|assessment| {
                dated_line(
                    &assessment.created_at.format("%Y-%m-%d").to_string(),
                    render_fields(MENTAL_HEALTH_FIELDS, assessment),
                )
            })
            .collect();
        sections.push(bullet_section("Mental health history:", lines));
    }

    if !records.medications.is_empty() {
        let lines = records
            .medications
            .iter()
            .map(|medication| {
                let details = render_fields(MEDICATION_FIELDS, medication);
                if details.is_empty() {
                    medication.medication_name.clone()
                } else {
                    format!("{} ({})", medication.medication_name, details.join(", "))
                }
            })
            .collect();
        sections.push(bullet_section("Active medications:", lines));
    }

    let insights = derive_insights(records);
    if !insights.is_empty() {
        sections.push(bullet_section("Insights:", insights.clone()));
    }

    // Only the header: the records held nothing renderable
    if sections.len() == 1 {
        return ProfileSummary::placeholder();
    }

    ProfileSummary {
        text: sections.join("\n"),
        insights,
    }
}

fn bullet_section(title: &str, lines: Vec<String>) -> String {
    let mut section = title.to_string();
    for line in lines {
        section.push_str("\n- ");
        section.push_str(&line);
    }
    section
}

fn dated_line(date: &str, fields: Vec<String>) -> String {
    if fields.is_empty() {
        format!("{}: no details recorded", date)
    } else {
        format!("{}: {}", date, fields.join(", "))
    }
}

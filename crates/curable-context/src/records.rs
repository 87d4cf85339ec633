use curable_persist::{
    Medication, MentalHealthAssessment, Onboarding, PersistenceClient, WeeklyCheckin,
};

/// How many of the most recent rows to read per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLimits {
    pub checkins: i64,
    pub mental_health: i64,
}

impl Default for RecordLimits {
    fn default() -> Self {
        Self {
            checkins: 2,
            mental_health: 3,
        }
    }
}

/// Health records of one user, newest first within each category
#[derive(Debug, Clone, Default)]
pub struct PatientRecords {
    pub onboarding: Option<Onboarding>,
    pub checkins: Vec<WeeklyCheckin>,
    pub mental_health: Vec<MentalHealthAssessment>,
    pub medications: Vec<Medication>,
}

impl PatientRecords {
    /// Read every category; a failed read fails the whole load
    pub async fn load(
        persist: &dyn PersistenceClient,
        user_id: &str,
        limits: RecordLimits,
    ) -> curable_persist::Result<Self> {
        Ok(Self {
            onboarding: persist.get_onboarding(user_id).await?,
            checkins: persist.recent_checkins(user_id, Some(limits.checkins)).await?,
            mental_health: persist
                .recent_mental_health(user_id, Some(limits.mental_health))
                .await?,
            medications: persist.active_medications(user_id).await?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.onboarding.is_none()
            && self.checkins.is_empty()
            && self.mental_health.is_empty()
            && self.medications.is_empty()
    }

    pub fn latest_checkin(&self) -> Option<&WeeklyCheckin> {
        self.checkins.first()
    }

    pub fn previous_checkin(&self) -> Option<&WeeklyCheckin> {
        self.checkins.get(1)
    }

    pub fn latest_mental_health(&self) -> Option<&MentalHealthAssessment> {
        self.mental_health.first()
    }
}

use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

use crate::models::{
    ChatSummary, ClinicalInsight, Medication, MentalHealthAssessment, Onboarding,
    SymptomAssessment, WeeklyCheckin,
};

/// Records carrying a creation timestamp
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! timestamped {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Timestamped for $ty {
                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
            }
        )*
    };
}

timestamped!(
    Onboarding,
    WeeklyCheckin,
    MentalHealthAssessment,
    Medication,
    SymptomAssessment,
    ChatSummary,
);

/// MongoDB document for an agnostic record.
///
/// chrono timestamps serialize as strings, which do not sort chronologically
/// in every case, so a BSON date copy is stored next to the record for ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRecord<T> {
    #[serde(flatten)]
    pub record: T,
    pub recorded_at: bson::DateTime,
}

impl<T: Timestamped> From<T> for MongoRecord<T> {
    fn from(record: T) -> Self {
        let recorded_at = bson::DateTime::from_chrono(record.created_at());
        Self { record, recorded_at }
    }
}

/// MongoDB document for a cached clinical insight; `valid_until` backs the expiry filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoInsight {
    #[serde(flatten)]
    pub insight: ClinicalInsight,
    pub valid_until: bson::DateTime,
    pub recorded_at: bson::DateTime,
}

impl From<ClinicalInsight> for MongoInsight {
    fn from(insight: ClinicalInsight) -> Self {
        Self {
            valid_until: bson::DateTime::from_chrono(insight.expires_at),
            recorded_at: bson::DateTime::from_chrono(insight.created_at),
            insight,
        }
    }
}

impl From<MongoInsight> for ClinicalInsight {
    fn from(doc: MongoInsight) -> Self {
        doc.insight
    }
}

pub mod insight;
pub mod profile;
pub mod records;

pub use insight::{ChatSummary, ClinicalInsight};
pub use profile::{Profile, ThreadBinding};
pub use records::{
    Medication, MentalHealthAssessment, MetricRating, Onboarding, SymptomAssessment, WeeklyCheckin,
};

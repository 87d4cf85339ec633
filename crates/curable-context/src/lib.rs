mod default;
mod strategy;

pub mod descriptors;
pub mod diagnosis;
pub mod insight_cache;
pub mod insights;
pub mod records;
pub mod summarizer;
pub mod templates;

pub use default::DefaultContextStrategy;
pub use diagnosis::{AssessmentReport, SymptomAssessor};
pub use insight_cache::{ClinicalContext, InsightCache, InsightCacheConfig, InsightSource};
pub use insights::{build_greeting, derive_insights, GENERIC_GREETING};
pub use records::{PatientRecords, RecordLimits};
pub use strategy::{ContextStrategy, SeedContext};
pub use summarizer::{ProfileSummarizer, ProfileSummary, NO_PROFILE_DATA};

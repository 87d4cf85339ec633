pub mod dbs;
pub mod error;
pub mod models;
pub mod trait_client;

pub use dbs::memory::MemoryPersistenceClient;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
pub use error::{PersistError, Result};
pub use models::{
    ChatSummary, ClinicalInsight, Medication, MentalHealthAssessment, MetricRating, Onboarding,
    Profile, SymptomAssessment, ThreadBinding, WeeklyCheckin,
};
pub use trait_client::PersistenceClient;

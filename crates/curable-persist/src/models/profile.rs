use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Patient profile (collection `profiles`); `id` is the user id.
///
/// The assistant thread binding lives on the profile so that a user owns at
/// most one thread at any time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub genotype: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub context_seeded: bool,
    #[serde(default)]
    pub thread_updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Current thread binding, if the user has one
    pub fn thread_binding(&self) -> Option<ThreadBinding> {
        self.thread_id.as_ref().map(|thread_id| ThreadBinding {
            user_id: self.id.clone(),
            thread_id: thread_id.clone(),
            context_seeded: self.context_seeded,
        })
    }
}

/// User → assistant thread mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadBinding {
    pub user_id: String,
    pub thread_id: String,
    /// Profile context has been injected into this thread
    pub context_seeded: bool,
}

impl ThreadBinding {
    /// Binding for a freshly created thread
    pub fn new(user_id: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            thread_id: thread_id.into(),
            context_seeded: false,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Text content of a completion message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(String);

impl Content {
    /// Create text content
    pub fn text(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn to_text(&self) -> String {
        self.0.clone()
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

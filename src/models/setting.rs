use serde::{Deserialize, Serialize};

use super::deserialize_nullable_string;

/// Instance-wide announcement shown above every screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Announcement {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub content: String,
}

impl Announcement {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_nullable_string};

/// A todo-list task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

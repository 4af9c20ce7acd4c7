use serde::{Deserialize, Serialize};

use super::deserialize_id;

/// A tag as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tag {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One entry of the tag autocomplete.
///
/// Either refers to an existing tag (`id` set) or stands for "create a tag
/// named `create`" (`create` set, no `id`). Only the first kind may reach an
/// add-item request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagOption {
    pub id: Option<String>,
    pub label: String,
    pub create: Option<String>,
}

impl TagOption {
    pub fn existing(tag: &Tag) -> Self {
        Self {
            id: Some(tag.id.clone()),
            label: tag.name.clone(),
            create: None,
        }
    }

    /// Synthetic "create `name`" entry.
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: None,
            label: format!("Add tag \"{}\"", name),
            create: Some(name),
        }
    }

    /// True for a "create" entry that has not been resolved to a tag yet.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_none() && self.create.is_some()
    }

    /// Exactly one of `id` / `create` is set.
    pub fn is_committable(&self) -> bool {
        self.id.is_some() != self.create.is_some()
    }
}

impl From<&Tag> for TagOption {
    fn from(tag: &Tag) -> Self {
        TagOption::existing(tag)
    }
}

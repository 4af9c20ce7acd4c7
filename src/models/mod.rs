//! Transient view models exchanged with the remote services.

mod format;
mod insight;
mod item;
mod setting;
mod tag;
mod task;

pub use format::{format_input_number, format_timestamp};
pub use insight::{histogram_range, DaySpending, MonthlySpending};
pub use item::{Amount, AmountType, Item, ItemUpdate, NewItem};
pub use setting::Announcement;
pub use tag::{Tag, TagOption};
pub use task::Task;

use serde::{Deserialize, Deserializer};

/// Entity id as the backend may send it: a JSON string or a JSON integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => text,
            WireId::Signed(n) => n.to_string(),
            WireId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Ids are kept as strings whatever their wire form.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(String::from)
}

/// `null` reads as the empty string.
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A missing or `null` list reads as empty; each id as in [`deserialize_id`].
pub(crate) fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Option::<Vec<WireId>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(ids.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_nullable_string")]
        name: String,
        #[serde(default, deserialize_with = "deserialize_id_list")]
        tags: Vec<String>,
    }

    #[test]
    fn test_deserialize_integer_id() {
        let w: Wrapper = serde_json::from_str(r#"{"id": 42, "name": null}"#).unwrap();
        assert_eq!(w.id, "42");
        assert_eq!(w.name, "");
        assert!(w.tags.is_empty());
    }

    #[test]
    fn test_rejects_non_scalar_id() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": {"n": 1}}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": 1.5}"#).is_err());
    }

    #[test]
    fn test_deserialize_mixed_id_list() {
        let w: Wrapper =
            serde_json::from_str(r#"{"id": "a", "name": "x", "tags": [1, "2"]}"#).unwrap();
        assert_eq!(w.tags, vec!["1".to_string(), "2".to_string()]);
    }
}

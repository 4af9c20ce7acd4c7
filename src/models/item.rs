use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_id, deserialize_id_list, deserialize_nullable_string};

/// Direction of money flow for an accounting item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmountType {
    Income,
    #[default]
    Expense,
}

impl AmountType {
    pub fn label(&self) -> &'static str {
        match self {
            AmountType::Income => "income",
            AmountType::Expense => "expense",
        }
    }
}

/// A decimal amount in a currency. The amount stays a string end to end so
/// the user's digits reach the backend untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amount {
    pub amount: String,
    pub currency: String,
}

impl Amount {
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
        }
    }
}

/// An accounting entry as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    pub amount: Amount,
    #[serde(default, rename = "type")]
    pub amount_type: AmountType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub tags: Vec<String>,
}

/// Payload of an add-item call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub amount_type: AmountType,
    pub tags: Vec<String>,
}

/// Partial update of an existing item; `None` fields are left as they are.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ItemUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Apply the update to a local copy of the item.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(amount) = &self.amount {
            item.amount = amount.clone();
        }
        if let Some(occurred_at) = self.occurred_at {
            item.occurred_at = Some(occurred_at);
        }
    }
}

//! Remote service traits consumed by the screens.
//!
//! Every call is an independent async request; implementations must be safe
//! to call concurrently from several in-flight commits.

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::{
    Announcement, DaySpending, Item, ItemUpdate, MonthlySpending, NewItem, Tag, Task,
};

/// Accounting items, their currencies and tags, and spending summaries.
#[async_trait]
pub trait AccountingService: Send + Sync {
    async fn list_items(&self) -> ServiceResult<Vec<Item>>;

    async fn add_item(&self, item: NewItem) -> ServiceResult<Item>;

    async fn update_item(&self, update: ItemUpdate) -> ServiceResult<Item>;

    async fn delete_item(&self, id: &str) -> ServiceResult<()>;

    async fn list_currencies(&self) -> ServiceResult<Vec<String>>;

    /// Tags whose name contains `keyword`; every tag for an empty keyword.
    async fn search_tags(&self, keyword: &str) -> ServiceResult<Vec<Tag>>;

    async fn create_tag(&self, name: &str) -> ServiceResult<Tag>;

    /// Daily expense and income over the last seven days, oldest first.
    async fn last_7_day_histogram(&self) -> ServiceResult<Vec<DaySpending>>;

    /// Monthly expense and income of the current year.
    async fn yearly_summary(&self) -> ServiceResult<Vec<MonthlySpending>>;
}

#[async_trait]
pub trait TodoListService: Send + Sync {
    async fn list_tasks(&self) -> ServiceResult<Vec<Task>>;

    async fn add_task(&self, name: &str) -> ServiceResult<Task>;

    async fn update_task(&self, id: &str, completed: bool) -> ServiceResult<Task>;
}

/// Administration of the instance-wide announcement.
#[async_trait]
pub trait InstanceSettingService: Send + Sync {
    async fn set_announcement(&self, content: &str) -> ServiceResult<()>;

    async fn revoke_announcement(&self) -> ServiceResult<()>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// The current announcement; empty content when none is set.
    async fn get_announcement(&self) -> ServiceResult<Announcement>;
}

//! In-memory service backends.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Announcement, DaySpending, Item, ItemUpdate, MonthlySpending, NewItem, Tag, Task,
};
use crate::reactive::lock;
use crate::traits::{AccountingService, InstanceSettingService, TodoListService, UserService};

/// One recorded service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub argument: String,
}

/// Releases a call parked by `hold`. Dropping the gate releases it too.
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

#[derive(Debug, Default)]
struct Controls {
    calls: Mutex<Vec<RecordedCall>>,
    next_failures: Mutex<HashMap<&'static str, VecDeque<ServiceError>>>,
    failures: Mutex<HashMap<&'static str, ServiceError>>,
    gates: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>>,
}

impl Controls {
    /// Record the call, wait for its gate if one is set, then apply any
    /// injected failure.
    async fn enter(&self, method: &'static str, argument: impl Into<String>) -> ServiceResult<()> {
        lock(&self.calls).push(RecordedCall {
            method,
            argument: argument.into(),
        });
        let gate = lock(&self.gates).get_mut(method).and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let queued = lock(&self.next_failures)
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        if let Some(err) = queued {
            return Err(err);
        }
        match lock(&self.failures).get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn hold(&self, method: &'static str) -> Gate {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).entry(method).or_default().push_back(rx);
        Gate(tx)
    }

    fn fail_next(&self, method: &'static str, err: ServiceError) {
        lock(&self.next_failures)
            .entry(method)
            .or_default()
            .push_back(err);
    }

    fn fail_always(&self, method: &'static str, err: ServiceError) {
        lock(&self.failures).insert(method, err);
    }

    fn clear_failures(&self) {
        lock(&self.next_failures).clear();
        lock(&self.failures).clear();
    }

    fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    fn call_count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.method == method).count()
    }

    fn arguments(&self, method: &str) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.argument.clone())
            .collect()
    }
}

macro_rules! controls {
    () => {
        /// Park the next call of `method` until the gate is released.
        pub fn hold(&self, method: &'static str) -> Gate {
            self.controls.hold(method)
        }

        /// Fail the next call of `method` with `err`.
        pub fn fail_next(&self, method: &'static str, err: ServiceError) {
            self.controls.fail_next(method, err);
        }

        /// Fail every call of `method` until [`Self::clear_failures`].
        pub fn fail_always(&self, method: &'static str, err: ServiceError) {
            self.controls.fail_always(method, err);
        }

        pub fn clear_failures(&self) {
            self.controls.clear_failures();
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.controls.calls()
        }

        pub fn call_count(&self, method: &str) -> usize {
            self.controls.call_count(method)
        }

        /// Recorded arguments of every call of `method`, in call order.
        pub fn arguments(&self, method: &str) -> Vec<String> {
            self.controls.arguments(method)
        }
    };
}

fn describe<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// In-memory accounting backend.
#[derive(Debug, Clone)]
pub struct MockAccountingService {
    controls: Arc<Controls>,
    items: Arc<Mutex<Vec<Item>>>,
    tags: Arc<Mutex<Vec<Tag>>>,
    currencies: Arc<Mutex<Vec<String>>>,
    histogram: Arc<Mutex<Vec<DaySpending>>>,
    months: Arc<Mutex<Vec<MonthlySpending>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for MockAccountingService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccountingService {
    pub fn new() -> Self {
        Self {
            controls: Arc::default(),
            items: Arc::default(),
            tags: Arc::default(),
            currencies: Arc::new(Mutex::new(vec![
                "TWD".to_string(),
                "USD".to_string(),
                "JPY".to_string(),
            ])),
            histogram: Arc::default(),
            months: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_tags(self, names: &[&str]) -> Self {
        for name in names {
            let tag = Tag::new(self.allocate_id(), *name);
            lock(&self.tags).push(tag);
        }
        self
    }

    pub fn with_items(self, items: Vec<Item>) -> Self {
        lock(&self.items).extend(items);
        self
    }

    pub fn with_currencies(self, currencies: &[&str]) -> Self {
        *lock(&self.currencies) = currencies.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_histogram(self, days: Vec<DaySpending>) -> Self {
        *lock(&self.histogram) = days;
        self
    }

    pub fn with_yearly_summary(self, months: Vec<MonthlySpending>) -> Self {
        *lock(&self.months) = months;
        self
    }

    controls!();

    pub fn items(&self) -> Vec<Item> {
        lock(&self.items).clone()
    }

    pub fn tags(&self) -> Vec<Tag> {
        lock(&self.tags).clone()
    }

    /// Every `add_item` payload received, in call order.
    pub fn added_items(&self) -> Vec<NewItem> {
        self.arguments("add_item")
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect()
    }

    fn allocate_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[async_trait]
impl AccountingService for MockAccountingService {
    async fn list_items(&self) -> ServiceResult<Vec<Item>> {
        self.controls.enter("list_items", "").await?;
        Ok(self.items())
    }

    async fn add_item(&self, item: NewItem) -> ServiceResult<Item> {
        self.controls.enter("add_item", describe(&item)).await?;
        let now = Utc::now();
        let created = Item {
            id: self.allocate_id(),
            name: item.name,
            amount: item.amount,
            amount_type: item.amount_type,
            created_at: Some(now),
            occurred_at: Some(now),
            tags: item.tags,
        };
        lock(&self.items).insert(0, created.clone());
        Ok(created)
    }

    async fn update_item(&self, update: ItemUpdate) -> ServiceResult<Item> {
        self.controls.enter("update_item", describe(&update)).await?;
        let mut items = lock(&self.items);
        let item = items
            .iter_mut()
            .find(|item| item.id == update.id)
            .ok_or_else(|| ServiceError::not_found(format!("item {}", update.id)))?;
        update.apply_to(item);
        Ok(item.clone())
    }

    async fn delete_item(&self, id: &str) -> ServiceResult<()> {
        self.controls.enter("delete_item", id).await?;
        lock(&self.items).retain(|item| item.id != id);
        Ok(())
    }

    async fn list_currencies(&self) -> ServiceResult<Vec<String>> {
        self.controls.enter("list_currencies", "").await?;
        Ok(lock(&self.currencies).clone())
    }

    async fn search_tags(&self, keyword: &str) -> ServiceResult<Vec<Tag>> {
        self.controls.enter("search_tags", keyword).await?;
        Ok(lock(&self.tags)
            .iter()
            .filter(|tag| tag.name.contains(keyword))
            .cloned()
            .collect())
    }

    async fn create_tag(&self, name: &str) -> ServiceResult<Tag> {
        self.controls.enter("create_tag", name).await?;
        let tag = Tag::new(self.allocate_id(), name);
        lock(&self.tags).push(tag.clone());
        Ok(tag)
    }

    async fn last_7_day_histogram(&self) -> ServiceResult<Vec<DaySpending>> {
        self.controls.enter("last_7_day_histogram", "").await?;
        Ok(lock(&self.histogram).clone())
    }

    async fn yearly_summary(&self) -> ServiceResult<Vec<MonthlySpending>> {
        self.controls.enter("yearly_summary", "").await?;
        Ok(lock(&self.months).clone())
    }
}

/// In-memory todo backend.
#[derive(Debug, Clone)]
pub struct MockTodoListService {
    controls: Arc<Controls>,
    tasks: Arc<Mutex<Vec<Task>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for MockTodoListService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTodoListService {
    pub fn new() -> Self {
        Self {
            controls: Arc::default(),
            tasks: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_tasks(self, names: &[&str]) -> Self {
        for name in names {
            let task = self.new_task(name);
            lock(&self.tasks).push(task);
        }
        self
    }

    controls!();

    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.tasks).clone()
    }

    fn new_task(&self, name: &str) -> Task {
        Task {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            name: name.to_string(),
            completed: false,
            created_at: Some(Utc::now()),
        }
    }
}

#[async_trait]
impl TodoListService for MockTodoListService {
    async fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        self.controls.enter("list_tasks", "").await?;
        Ok(self.tasks())
    }

    async fn add_task(&self, name: &str) -> ServiceResult<Task> {
        self.controls.enter("add_task", name).await?;
        let task = self.new_task(name);
        lock(&self.tasks).push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, completed: bool) -> ServiceResult<Task> {
        self.controls
            .enter("update_task", format!("{id}:{completed}"))
            .await?;
        let mut tasks = lock(&self.tasks);
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| ServiceError::not_found(format!("task {id}")))?;
        task.completed = completed;
        Ok(task.clone())
    }
}

/// Announcement text shared by the setting and user mocks.
pub type AnnouncementStore = Arc<Mutex<String>>;

#[derive(Debug, Clone, Default)]
pub struct MockInstanceSettingService {
    controls: Arc<Controls>,
    announcement: AnnouncementStore,
}

impl MockInstanceSettingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: AnnouncementStore) -> Self {
        Self {
            controls: Arc::default(),
            announcement: store,
        }
    }

    controls!();

    pub fn announcement(&self) -> String {
        lock(&self.announcement).clone()
    }
}

#[async_trait]
impl InstanceSettingService for MockInstanceSettingService {
    async fn set_announcement(&self, content: &str) -> ServiceResult<()> {
        self.controls.enter("set_announcement", content).await?;
        *lock(&self.announcement) = content.to_string();
        Ok(())
    }

    async fn revoke_announcement(&self) -> ServiceResult<()> {
        self.controls.enter("revoke_announcement", "").await?;
        lock(&self.announcement).clear();
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockUserService {
    controls: Arc<Controls>,
    announcement: AnnouncementStore,
}

impl MockUserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: AnnouncementStore) -> Self {
        Self {
            controls: Arc::default(),
            announcement: store,
        }
    }

    controls!();
}

#[async_trait]
impl UserService for MockUserService {
    async fn get_announcement(&self) -> ServiceResult<Announcement> {
        self.controls.enter("get_announcement", "").await?;
        Ok(Announcement::new(lock(&self.announcement).clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_matches_substring() {
        let service = MockAccountingService::new().with_tags(&["food", "fast food", "rent"]);

        let found = service.search_tags("foo").await.unwrap();
        let all = service.search_tags("").await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(all.len(), 3);
        assert_eq!(service.arguments("search_tags"), vec!["foo", ""]);
    }

    #[tokio::test]
    async fn test_add_item_recorded_and_listed() {
        let service = MockAccountingService::new();
        let new_item = NewItem {
            name: "Coffee".to_string(),
            amount: crate::models::Amount::new("3.5", "TWD"),
            amount_type: crate::models::AmountType::Expense,
            tags: vec![],
        };

        service.add_item(new_item.clone()).await.unwrap();

        assert_eq!(service.added_items(), vec![new_item]);
        assert_eq!(service.list_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let service = MockTodoListService::new();
        service.fail_next("add_task", ServiceError::transport("down"));

        assert!(service.add_task("a").await.is_err());
        assert!(service.add_task("a").await.is_ok());
        assert_eq!(service.call_count("add_task"), 2);
    }

    #[tokio::test]
    async fn test_fail_always_until_cleared() {
        let service = MockUserService::new();
        service.fail_always("get_announcement", ServiceError::transport("down"));
        assert!(service.get_announcement().await.is_err());
        assert!(service.get_announcement().await.is_err());
        service.clear_failures();
        assert!(service.get_announcement().await.is_ok());
    }

    #[tokio::test]
    async fn test_gate_parks_call() {
        let service = Arc::new(MockAccountingService::new());
        let gate = service.hold("list_currencies");
        let pending = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.list_currencies().await })
        };
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gate.release();
        let currencies = pending.await.unwrap().unwrap();
        assert_eq!(currencies, vec!["TWD", "USD", "JPY"]);
    }

    #[tokio::test]
    async fn test_shared_announcement_store() {
        let store = AnnouncementStore::default();
        let settings = MockInstanceSettingService::with_store(Arc::clone(&store));
        let users = MockUserService::with_store(store);

        settings.set_announcement("maintenance").await.unwrap();
        assert_eq!(users.get_announcement().await.unwrap().content, "maintenance");

        settings.revoke_announcement().await.unwrap();
        assert!(users.get_announcement().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let service = MockAccountingService::new();
        let err = service.update_item(ItemUpdate::new("404")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}

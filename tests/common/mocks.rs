//! Mock backends and screen fixtures.
//!
//! Re-exports the in-memory services from `accountcat_view::adapters::mock`
//! and mounts screens over them.

#![allow(dead_code)]

pub use accountcat_view::adapters::mock::{
    AnnouncementStore, Gate, MockAccountingService, MockHttpClient, MockInstanceSettingService,
    MockResponse, MockTodoListService, MockUserService,
};

use std::sync::Arc;
use std::time::Duration;

use accountcat_view::config::ViewConfig;
use accountcat_view::models::{Amount, AmountType, Item};
use accountcat_view::view_state::{
    AccountingScreen, InstanceSettingScreen, TodoListScreen, WeeklyHistogram, YearlySummary,
};

pub fn test_config() -> ViewConfig {
    ViewConfig::default().with_banner_duration(Duration::from_secs(5))
}

pub fn mount_accounting(backend: &MockAccountingService) -> AccountingScreen {
    AccountingScreen::mount(Arc::new(backend.clone()), &test_config())
}

pub fn mount_weekly_histogram(backend: &MockAccountingService) -> WeeklyHistogram {
    WeeklyHistogram::mount(Arc::new(backend.clone()))
}

pub fn mount_yearly_summary(backend: &MockAccountingService) -> YearlySummary {
    YearlySummary::mount(Arc::new(backend.clone()))
}

pub fn mount_todo(backend: &MockTodoListService) -> TodoListScreen {
    TodoListScreen::mount(Arc::new(backend.clone()))
}

pub fn mount_instance_setting(backend: &MockInstanceSettingService) -> InstanceSettingScreen {
    InstanceSettingScreen::mount(Arc::new(backend.clone()), &test_config())
}

/// A stored item as the backend would list it.
pub fn item(id: &str, name: &str, amount: &str) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        amount: Amount::new(amount, "TWD"),
        amount_type: AmountType::Expense,
        created_at: None,
        occurred_at: None,
        tags: Vec::new(),
    }
}

//! JSON-over-HTTP client for the AccountCat services.
//!
//! Each call is a POST of a JSON request body to
//! `{base_url}/{package}.{Service}/{Method}`; the response body is the JSON
//! encoded reply. Parameterless calls send `{}`, and an empty reply body
//! decodes as `null`. Calls without a result accept `{}` or nothing.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Announcement, DaySpending, Item, ItemUpdate, MonthlySpending, NewItem, Tag, Task,
};
use crate::traits::{
    AccountingService, Headers, HttpClient, InstanceSettingService, TodoListService, UserService,
};

const ACCOUNTING: &str = "accountcat.accounting.Accounting";
const TODOLIST: &str = "accountcat.todolist.Todolist";
const INSTANCE_SETTING: &str = "accountcat.instance_setting.InstanceSetting";
const USER: &str = "accountcat.user.User";

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct ById<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct ByName<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct TagSearch<'a> {
    keyword: &'a str,
}

#[derive(Serialize)]
struct TaskUpdate<'a> {
    id: &'a str,
    completed: bool,
}

#[derive(Serialize)]
struct AnnouncementContent<'a> {
    content: &'a str,
}

/// Reply of calls without a result: `{}`, `null` or an empty body.
#[derive(Deserialize)]
struct Ack {}

#[derive(Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Deserialize)]
struct CurrencyList {
    #[serde(default)]
    code: Vec<String>,
}

#[derive(Deserialize)]
struct Histogram {
    #[serde(default)]
    data: Vec<DaySpending>,
}

#[derive(Deserialize)]
struct YearlySummary {
    #[serde(default)]
    months: Vec<MonthlySpending>,
}

#[derive(Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct Param {
    #[serde(default)]
    announcement: String,
}

/// Implements every service trait over one [`HttpClient`].
#[derive(Debug, Clone)]
pub struct RpcClient<C> {
    http: C,
    base_url: String,
    headers: Headers,
}

impl<C: HttpClient> RpcClient<C> {
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
        }
    }

    /// Add a header sent with every call, e.g. an authorization token.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, service: &str, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, service, method)
    }

    async fn call<Req, Resp>(&self, service: &str, method: &str, request: &Req) -> ServiceResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(service, method);
        let body = serde_json::to_string(request)?;
        debug!(%url, "rpc call");

        let response = self.http.post(&url, &body, &self.headers).await?;
        if !response.is_success() {
            return Err(ServiceError::Status {
                status: response.status,
                message: response.text(),
            });
        }

        if response.is_blank() {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(response.json()?)
    }

    async fn call_unit<Req>(&self, service: &str, method: &str, request: &Req) -> ServiceResult<()>
    where
        Req: Serialize + Sync,
    {
        let _: Option<Ack> = self.call(service, method, request).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: HttpClient> AccountingService for RpcClient<C> {
    async fn list_items(&self) -> ServiceResult<Vec<Item>> {
        let list: ItemList = self.call(ACCOUNTING, "List", &Empty {}).await?;
        Ok(list.items)
    }

    async fn add_item(&self, item: NewItem) -> ServiceResult<Item> {
        self.call(ACCOUNTING, "Add", &item).await
    }

    async fn update_item(&self, update: ItemUpdate) -> ServiceResult<Item> {
        self.call(ACCOUNTING, "UpdateItem", &update).await
    }

    async fn delete_item(&self, id: &str) -> ServiceResult<()> {
        self.call_unit(ACCOUNTING, "Delete", &ById { id }).await
    }

    async fn list_currencies(&self) -> ServiceResult<Vec<String>> {
        let list: CurrencyList = self.call(ACCOUNTING, "ListCurrency", &Empty {}).await?;
        Ok(list.code)
    }

    async fn search_tags(&self, keyword: &str) -> ServiceResult<Vec<Tag>> {
        let list: TagList = self
            .call(ACCOUNTING, "CompleteTag", &TagSearch { keyword })
            .await?;
        Ok(list.tags)
    }

    async fn create_tag(&self, name: &str) -> ServiceResult<Tag> {
        self.call(ACCOUNTING, "CreateTag", &ByName { name }).await
    }

    async fn last_7_day_histogram(&self) -> ServiceResult<Vec<DaySpending>> {
        let histogram: Option<Histogram> =
            self.call(ACCOUNTING, "GetLast7DayHistogram", &Empty {}).await?;
        Ok(histogram.map(|h| h.data).unwrap_or_default())
    }

    async fn yearly_summary(&self) -> ServiceResult<Vec<MonthlySpending>> {
        let summary: Option<YearlySummary> =
            self.call(ACCOUNTING, "GetYearlySummary", &Empty {}).await?;
        Ok(summary.map(|s| s.months).unwrap_or_default())
    }
}

#[async_trait]
impl<C: HttpClient> TodoListService for RpcClient<C> {
    async fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        let list: TaskList = self.call(TODOLIST, "List", &Empty {}).await?;
        Ok(list.tasks)
    }

    async fn add_task(&self, name: &str) -> ServiceResult<Task> {
        self.call(TODOLIST, "Add", &ByName { name }).await
    }

    async fn update_task(&self, id: &str, completed: bool) -> ServiceResult<Task> {
        self.call(TODOLIST, "UpdateTask", &TaskUpdate { id, completed })
            .await
    }
}

#[async_trait]
impl<C: HttpClient> InstanceSettingService for RpcClient<C> {
    async fn set_announcement(&self, content: &str) -> ServiceResult<()> {
        self.call_unit(INSTANCE_SETTING, "SetAnnouncement", &AnnouncementContent { content })
            .await
    }

    async fn revoke_announcement(&self) -> ServiceResult<()> {
        self.call_unit(INSTANCE_SETTING, "RevokeAnnouncement", &Empty {})
            .await
    }
}

#[async_trait]
impl<C: HttpClient> UserService for RpcClient<C> {
    async fn get_announcement(&self) -> ServiceResult<Announcement> {
        let param: Param = self.call(USER, "GetParam", &Empty {}).await?;
        Ok(Announcement::new(param.announcement))
    }
}

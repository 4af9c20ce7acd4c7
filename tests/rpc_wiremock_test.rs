//! RPC client tests against a real HTTP server.
//!
//! Uses wiremock to stand in for the AccountCat backend and exercises the
//! reqwest transport end to end: request paths and bodies, reply decoding,
//! status errors, and a screen mounted over the live client.

mod common;

use std::sync::Arc;

use accountcat_view::adapters::{ReqwestHttpClient, RpcClient};
use accountcat_view::error::{ErrorCategory, ServiceError};
use accountcat_view::models::{Amount, AmountType, NewItem};
use accountcat_view::traits::{AccountingService, InstanceSettingService, TodoListService, UserService};
use accountcat_view::view_state::{AccountingScreen, WeeklyHistogram};
use common::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn rpc(server: &MockServer) -> RpcClient<ReqwestHttpClient> {
    RpcClient::new(ReqwestHttpClient::new(), format!("{}/api", server.uri()))
}

#[tokio::test]
async fn test_list_currency_path_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/ListCurrency"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": ["TWD", "JPY"]})))
        .expect(1)
        .mount(&server)
        .await;

    let currencies = rpc(&server).await.list_currencies().await.unwrap();

    assert_eq!(currencies, vec!["TWD", "JPY"]);
}

#[tokio::test]
async fn test_list_items_decodes_numeric_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/List"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": 12,
                "name": "Lunch",
                "amount": {"amount": "120", "currency": "TWD"},
                "type": "expense",
                "createdAt": "2024-03-01T04:05:06Z",
                "tags": [3, "4"]
            }]
        })))
        .mount(&server)
        .await;

    let items = rpc(&server).await.list_items().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "12");
    assert_eq!(items[0].tags, vec!["3", "4"]);
    assert!(items[0].created_at.is_some());
}

#[tokio::test]
async fn test_weekly_histogram_over_http_loads_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/GetLast7DayHistogram"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"date": "10/08", "expense": "120", "income": "0"},
                {"date": "10/14", "expense": 35.5, "income": 0}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chart = WeeklyHistogram::mount(Arc::new(rpc(&server).await));
    let range = wait_for(chart.range(), |r| !r.is_empty()).await;

    assert_eq!(range, "(10/08 ~ 10/14)");
    assert_eq!(chart.dataset().get().len(), 2);
}

#[tokio::test]
async fn test_add_item_sends_new_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/Add"))
        .and(body_json(json!({
            "name": "Coffee",
            "amount": {"amount": "3.5", "currency": "TWD"},
            "type": "expense",
            "tags": ["7"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "x1",
            "name": "Coffee",
            "amount": {"amount": "3.5", "currency": "TWD"},
            "type": "expense",
            "tags": ["7"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = rpc(&server)
        .await
        .add_item(NewItem {
            name: "Coffee".to_string(),
            amount: Amount::new("3.5", "TWD"),
            amount_type: AmountType::Expense,
            tags: vec!["7".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(item.id, "x1");
}

#[tokio::test]
async fn test_unit_calls_accept_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/Delete"))
        .and(body_json(json!({"id": "9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.instance_setting.InstanceSetting/RevokeAnnouncement"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = rpc(&server).await;
    client.delete_item("9").await.unwrap();
    client.revoke_announcement().await.unwrap();
}

#[tokio::test]
async fn test_todo_and_user_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.todolist.Todolist/UpdateTask"))
        .and(body_json(json!({"id": "5", "completed": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 5, "name": "laundry", "completed": true})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.user.User/GetParam"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"announcement": "hi"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = rpc(&server).await;
    let task = client.update_task("5", true).await.unwrap();
    let announcement = client.get_announcement().await.unwrap();

    assert!(task.completed);
    assert_eq!(announcement.content, "hi");
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/CompleteTag"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let err = rpc(&server).await.search_tags("foo").await.unwrap_err();

    assert_eq!(
        err,
        ServiceError::Status {
            status: 500,
            message: "database down".to_string(),
        }
    );
    assert_eq!(err.category(), ErrorCategory::Server);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    drop(server);

    let client = RpcClient::new(ReqwestHttpClient::new(), base);
    let err = client.list_tasks().await.unwrap_err();

    assert!(err.is_retryable(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_accounting_screen_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/List"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1", "name": "Rent", "amount": {"amount": "800", "currency": "USD"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/ListCurrency"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": ["USD"]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/accountcat.accounting.Accounting/CompleteTag"))
        .and(body_json(json!({"keyword": ""})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"tags": [{"id": 1, "name": "home"}]})),
        )
        .mount(&server)
        .await;

    let service: Arc<dyn AccountingService> = Arc::new(rpc(&server).await);
    let screen = AccountingScreen::mount(service, &test_config());

    let items = wait_for(screen.items(), |i| i.is_some()).await.unwrap_or_default();
    let currencies = wait_for(screen.currencies(), |c| c.is_some()).await;
    let options = wait_for(screen.tag_options(), |o| !o.is_empty()).await;

    assert_eq!(items[0].name, "Rent");
    assert_eq!(currencies, Some(vec!["USD".to_string()]));
    assert_eq!(options[0].id.as_deref(), Some("1"));
    assert_eq!(options[0].label, "home");
}

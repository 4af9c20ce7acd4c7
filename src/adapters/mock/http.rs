//! Scripted HTTP transport.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::reactive::lock;
use crate::traits::{Headers, HttpClient, HttpError, Response};

/// One POST as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(Response),
    Error(HttpError),
}

/// Transport replying from a route table.
///
/// A route matches every URL it is a prefix of; the longest matching route
/// answers, then the fallback. Unrouted calls fail with
/// [`HttpError::Connect`].
///
/// ```ignore
/// let http = MockHttpClient::new();
/// http.route(
///     "http://test/api/accountcat.accounting.Accounting/ListCurrency",
///     MockResponse::Success(Response::new(200, r#"{"code":["TWD"]}"#)),
/// );
/// let rpc = RpcClient::new(http.clone(), "http://test/api");
/// assert_eq!(rpc.list_currencies().await?, vec!["TWD"]);
/// assert_eq!(http.requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    fallback: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls under `prefix` with `response`, replacing an earlier
    /// route for the same prefix.
    pub fn route(&self, prefix: &str, response: MockResponse) {
        let mut routes = lock(&self.routes);
        routes.retain(|(p, _)| p != prefix);
        routes.push((prefix.to_string(), response));
    }

    /// Answer every unrouted call with `response`.
    pub fn fallback(&self, response: MockResponse) {
        *lock(&self.fallback) = Some(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn answer(&self, url: &str) -> Option<MockResponse> {
        let routed = lock(&self.routes)
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, response)| response.clone());
        routed.or_else(|| lock(&self.fallback).clone())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_owned(),
            headers: headers.clone(),
            body: body.to_owned(),
        });
        match self.answer(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Connect {
                url: url.to_owned(),
                reason: "no route".to_string(),
            }),
        }
    }
}

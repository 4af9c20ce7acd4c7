//! Production transport over `reqwest`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::trace;

use crate::config::ViewConfig;
use crate::traits::{Headers, HttpClient, HttpError, Response};

/// [`HttpClient`] sharing one `reqwest` connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Client without a request deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that gives up on a call after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map(Self::with_client)
            .map_err(|err| HttpError::Request {
                url: String::new(),
                reason: err.to_string(),
            })
    }

    /// Client configured from `config.request_timeout`.
    pub fn from_config(config: &ViewConfig) -> Result<Self, HttpError> {
        Self::with_timeout(config.request_timeout)
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn header_map(url: &str, headers: &Headers) -> Result<HeaderMap, HttpError> {
    let invalid = |reason: String| HttpError::Request {
        url: url.to_string(),
        reason,
    };
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn classify(url: &str, err: reqwest::Error) -> HttpError {
    let url = url.to_string();
    if err.is_timeout() {
        HttpError::Timeout { url }
    } else if err.is_builder() {
        HttpError::Request {
            url,
            reason: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        HttpError::Body {
            url,
            reason: err.to_string(),
        }
    } else {
        HttpError::Connect {
            url,
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let reply = self
            .client
            .post(url)
            .headers(header_map(url, headers)?)
            .body(body.to_owned())
            .send()
            .await
            .map_err(|err| classify(url, err))?;

        let status = reply.status().as_u16();
        let bytes = reply.bytes().await.map_err(|err| classify(url, err))?;
        trace!(%url, status, len = bytes.len(), "reply received");
        Ok(Response::new(status, bytes))
    }
}

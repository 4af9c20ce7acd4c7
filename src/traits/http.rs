//! Transport seam under the RPC services.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use thiserror::Error;

/// Request headers, by name.
pub type Headers = HashMap<String, String>;

/// Status and fully read body of one reply. Any status counts as a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body carries nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Body as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// No reply could be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("no reply from {url} in time")]
    Timeout { url: String },

    #[error("cannot build request for {url}: {reason}")]
    Request { url: String, reason: String },

    #[error("reply from {url} broke off: {reason}")]
    Body { url: String, reason: String },

    #[error("request aborted")]
    Aborted,
}

/// JSON POST transport.
///
/// Error statuses come back as a [`Response`]; [`HttpError`] is reserved for
/// calls that produced no reply at all.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;
}

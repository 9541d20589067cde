//! Types for outbound HTTP calls.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while sending a request.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded`, sent with the browser header profile.
    Form(Vec<(String, String)>),
    /// `application/json`.
    Json(Value),
}

/// An outbound POST.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub body: RequestBody,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn form(url: impl Into<String>, fields: Vec<(String, String)>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            body: RequestBody::Form(fields),
            timeout,
        }
    }

    pub fn json(url: impl Into<String>, body: Value, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            body: RequestBody::Json(body),
            timeout,
        }
    }

    /// Value of a form field, if this is a form request.
    pub fn form_field(&self, key: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            RequestBody::Json(_) => None,
        }
    }
}

/// Raw reply: HTTP status and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 reply with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// Sends POST requests.
///
/// Non-2xx statuses are not errors at this layer; callers decide from the body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;
}
